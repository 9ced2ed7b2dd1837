use algorand_http::AlgodClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("ALGOD_URL")?;
    let token = std::env::var("ALGOD_TOKEN").unwrap_or_default();

    let algod = if token.is_empty() {
        AlgodClient::without_token(url)
    } else {
        AlgodClient::new(url, token)
    };

    algod.health_check().execute().await?;
    println!("node is healthy");

    let status = algod.status_after_block(1).execute().await?;
    println!("last round: {:?}", status.get("last-round"));

    Ok(())
}
