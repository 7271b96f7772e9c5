#[tokio::main]
async fn main() -> anyhow::Result<()> {
    unisync_client_lib::run().await
}
