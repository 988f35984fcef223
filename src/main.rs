#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    rendiciones_server::run().await
}
