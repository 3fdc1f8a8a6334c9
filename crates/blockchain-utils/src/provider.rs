use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum ProviderError {
    #[snafu(display("Invalid RPC URL {url:?}"))]
    InvalidRpcUrl { url: String },
}

/// HTTP provider that signs with `signer` and fills nonce, gas and chain id.
pub fn create_http_wallet_provider(
    rpc_url: &str,
    signer: PrivateKeySigner,
) -> Result<DynProvider, ProviderError> {
    let url = rpc_url.parse().map_err(|_| ProviderError::InvalidRpcUrl {
        url: rpc_url.to_string(),
    })?;

    Ok(ProviderBuilder::new()
        .wallet(signer)
        .connect_http(url)
        .erased())
}
