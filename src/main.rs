#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = exam_automation::run().await {
        eprintln!("exam-automation fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
