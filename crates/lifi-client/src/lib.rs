mod serde_utils;
mod types;

pub use types::*;

use std::collections::HashMap;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use snafu::{ResultExt, Snafu};
use tracing::{debug, instrument};

pub const MAINNET_API_URL: &str = "https://li.quest/v1/";
pub const STAGING_API_URL: &str = "https://staging.li.quest/v1/";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to build HTTP client: {source:?}"))]
    BuildClient { source: reqwest::Error },

    #[snafu(display("Failed to send request: {source:?} at {loc}"))]
    Request {
        source: reqwest::Error,
        #[snafu(implicit)]
        loc: snafu::Location,
    },

    #[snafu(display("Failed to parse response: {source:?}"))]
    ParseResponse {
        source: reqwest::Error,
        #[snafu(implicit)]
        loc: snafu::Location,
    },

    #[snafu(display("LI.FI answered {status}: {body}"))]
    Status { status: StatusCode, body: String },

    #[snafu(display("Invalid base URL: {source:?}"))]
    InvalidUrl {
        source: url::ParseError,
        #[snafu(implicit)]
        loc: snafu::Location,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Client for the LI.FI REST API.
#[derive(Debug, Clone)]
pub struct LifiClient {
    client: Client,
    base_url: Url,
}

impl LifiClient {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let client = Client::builder().build().context(BuildClientSnafu)?;

        tracing::info!("Creating LifiClient with base URL: {}", base_url.as_ref());

        let base_url = Url::parse(base_url.as_ref()).context(InvalidUrlSnafu)?;

        Ok(Self { client, base_url })
    }

    /// EVM chains LI.FI can route on.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_chains(&self) -> Result<Vec<Chain>> {
        let mut url = self.base_url.join("chains").context(InvalidUrlSnafu)?;
        url.query_pairs_mut().append_pair("chainTypes", "EVM");

        let response: ChainsResponse = self.get(url).await?;
        Ok(response.chains)
    }

    /// Known tokens for each of `chains`, keyed by chain id.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_tokens(&self, chains: &[u64]) -> Result<HashMap<u64, Vec<Token>>> {
        let url = tokens_url(&self.base_url, chains)?;
        let response: TokensResponse = self.get(url).await?;
        Ok(response.tokens)
    }

    /// Candidate routes, best first according to the requested order.
    #[instrument(level = "debug", skip_all)]
    pub async fn get_routes(&self, request: &RoutesRequest) -> Result<Vec<Route>> {
        let url = self
            .base_url
            .join("advanced/routes")
            .context(InvalidUrlSnafu)?;

        debug!(
            from_chain = request.from_chain_id,
            to_chain = request.to_chain_id,
            amount = %request.from_amount,
            "requesting routes"
        );

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .context(RequestSnafu)?;
        let response: RoutesResponse = decode(response).await?;
        Ok(response.routes)
    }

    /// Returns `step` populated with its `transactionRequest`.
    #[instrument(level = "debug", skip_all, fields(step = %step.id, tool = %step.tool))]
    pub async fn get_step_transaction(&self, step: &Step) -> Result<Step> {
        let url = self
            .base_url
            .join("advanced/stepTransaction")
            .context(InvalidUrlSnafu)?;

        let response = self
            .client
            .post(url)
            .json(step)
            .send()
            .await
            .context(RequestSnafu)?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self), fields(tx_hash = %query.tx_hash))]
    pub async fn get_status(&self, query: &StatusQuery) -> Result<StatusResponse> {
        let url = status_url(&self.base_url, query)?;
        match self.client.get(url).send().await.context(RequestSnafu)? {
            // LI.FI answers 404 until it indexes the source transaction
            response if response.status() == StatusCode::NOT_FOUND => Ok(StatusResponse {
                status: TransferStatus::NotFound,
                substatus: None,
                substatus_message: None,
                sending: None,
                receiving: None,
            }),
            response => decode(response).await,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.client.get(url).send().await.context(RequestSnafu)?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return StatusSnafu { status, body }.fail();
    }
    response.json::<T>().await.context(ParseResponseSnafu)
}

fn tokens_url(base_url: &Url, chains: &[u64]) -> Result<Url> {
    let mut url = base_url.join("tokens").context(InvalidUrlSnafu)?;
    {
        let mut query_pairs = url.query_pairs_mut();
        if !chains.is_empty() {
            let joined = chains
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            query_pairs.append_pair("chains", &joined);
        }
        query_pairs.append_pair("chainTypes", "EVM");
    }
    Ok(url)
}

fn status_url(base_url: &Url, query: &StatusQuery) -> Result<Url> {
    let mut url = base_url.join("status").context(InvalidUrlSnafu)?;
    {
        let mut query_pairs = url.query_pairs_mut();
        query_pairs.append_pair("txHash", &query.tx_hash);
        if let Some(bridge) = &query.bridge {
            query_pairs.append_pair("bridge", bridge);
        }
        if let Some(from_chain) = query.from_chain {
            query_pairs.append_pair("fromChain", &from_chain.to_string());
        }
        if let Some(to_chain) = query.to_chain {
            query_pairs.append_pair("toChain", &to_chain.to_string());
        }
    }
    Ok(url)
}
