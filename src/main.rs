use log::{error, info};
use prov_adapters::host::memory::MemoryHost;
use prov_core::{PipelineResult, ProvisioningConfig};
use prov_domain::{ProvisioningParams, ProvisioningRequest, UserId};
use provflow::demo::{demo_request, stage_package, DEMO_PAYLOAD};
use provflow::forward_progress;

struct Args {
    request: Option<String>,
    payload: Option<String>,
    user: UserId,
    installed: Option<u64>,
}

// CLI mínima: `provflow [REQUEST.json] [--user <N>] [--payload <FILE>] [--installed <VERSION>]`
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut parsed = Args { request: None,
                            payload: None,
                            user: 0,
                            installed: None };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--user" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse().ok()) {
                    parsed.user = v;
                }
            }
            "--payload" => {
                i += 1;
                parsed.payload = args.get(i).cloned();
            }
            "--installed" => {
                i += 1;
                parsed.installed = args.get(i).and_then(|v| v.parse().ok());
            }
            other => parsed.request = Some(other.to_string()),
        }
        i += 1;
    }
    parsed
}

fn load_params(path: Option<&str>) -> Result<ProvisioningParams, String> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
            ProvisioningRequest::parse_params(&json).map_err(|e| e.to_string())
        }
        None => ProvisioningParams::try_from(demo_request()).map_err(|e| e.to_string()),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = parse_args();

    let config = match ProvisioningConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[provflow] config error: {e}");
            std::process::exit(4);
        }
    };
    let params = match load_params(args.request.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[provflow] invalid request: {e}");
            std::process::exit(4);
        }
    };
    let payload = match &args.payload {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("[provflow] cannot read payload {path}: {e}");
                std::process::exit(4);
            }
        },
        None => DEMO_PAYLOAD.to_vec(),
    };

    let host = MemoryHost::new();
    if let Some(version) = args.installed {
        host.packages.set_installed(params.infer_device_admin_package_name(), version);
    }
    stage_package(&host, &params, &config, &payload);

    let mut engine = match provflow::prepare(&params, &host.services(), &config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("[provflow] {e}");
            std::process::exit(4);
        }
    };

    let cancel = engine.cancellation_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            cancel.cancel();
        }
    });

    let progress = engine.subscribe();
    let printer = tokio::spawn(forward_progress(progress, |event| match serde_json::to_string(event) {
                                   Ok(line) => println!("{line}"),
                                   Err(e) => error!("could not serialize event {}: {e}", event.seq),
                               }));

    let result = engine.run(args.user).await;
    drop(engine);
    let _ = printer.await;
    match result {
        Ok(PipelineResult::Completed) => {
            println!("provisioning completed; installed: {:?}", host.installer.installs());
        }
        Ok(PipelineResult::Failed { step_id, kind, message }) => {
            eprintln!("[provflow] step {step_id} failed: {kind} (code {}) {}", kind.code(), message.unwrap_or_default());
            std::process::exit(2);
        }
        Ok(PipelineResult::Cancelled) => {
            eprintln!("[provflow] cancelled");
            std::process::exit(3);
        }
        Err(e) => {
            eprintln!("[provflow] engine error: {e}");
            std::process::exit(5);
        }
    }
}
