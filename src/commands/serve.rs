use crate::error::Error;
use crate::server;

pub fn run(port: u16) {
    println!("🚀 Starting tickerdash server on port {}", port);

    // Create Tokio runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ {}", Error::Io(format!("Failed to create runtime: {}", e)));
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(server::serve(port)) {
        eprintln!("❌ Server failed: {}", e);
        std::process::exit(1);
    }
}
