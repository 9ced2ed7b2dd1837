use algorand_http::{AlgodClient, IntDecoding, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let algod = AlgodClient::from_env().map_err(anyhow::Error::msg)?;

    // 312769 is the USDt asset on mainnet; its total supply does not fit
    // an f64 exactly, so decode the chain-scale fields as big integers.
    let asset = algod
        .asset_information(312_769)
        .int_decoding(IntDecoding::MixedBigInt)
        .execute()
        .await?;

    let total = asset
        .get("params")
        .and_then(|params| params.get("total"))
        .and_then(Value::as_bigint);
    println!("asset total supply: {total:?}");

    Ok(())
}
