#[tokio::main]
async fn main() -> anyhow::Result<()> {
    podcycle_ui_terminal::run().await
}
