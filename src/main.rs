#[tokio::main]
async fn main() -> anyhow::Result<()> {
    variant_sync_lib::run().await
}
