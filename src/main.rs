use dblp_client::cluster::NodeRegistry;
use dblp_client::config::{ClientConfig, USAGE};
use dblp_client::console::{Console, MenuChoice};
use dblp_client::membership::MembershipController;
use dblp_client::query::QueryDispatcher;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match ClientConfig::from_env_and_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if config.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    tracing::info!(
        "Connecting to {} storage server(s) ({} framing, {:?} timeout)",
        config.nodes.len(),
        config.framing,
        config.request_timeout
    );

    let transport = config.transport();

    // 1. Cluster view:
    let mut registry = match NodeRegistry::connect(&config.nodes, &transport).await {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("{}, exiting", e);
            std::process::exit(1);
        }
    };

    // 2. Query and membership paths share the transport settings:
    let dispatcher = QueryDispatcher::new(transport.clone(), config.total_chunks);
    let controller = MembershipController::new(transport);

    // 3. Menu loop:
    let mut console = Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    console
        .print_servers("Connected storage servers", &registry.addresses())
        .await?;

    run(&mut console, &mut registry, &dispatcher, &controller).await?;

    registry.close_all().await;
    tracing::info!("All connections closed");

    Ok(())
}

async fn run<R, W>(
    console: &mut Console<R, W>,
    registry: &mut NodeRegistry,
    dispatcher: &QueryDispatcher,
    controller: &MembershipController,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(choice) = console.read_menu_choice().await? {
        match choice {
            MenuChoice::Query => {
                let Some(request) = console.prompt_query().await? else {
                    break;
                };

                // Ctrl-C while the query runs stops waiting for slow servers.
                let cancel = CancellationToken::new();
                let watcher = {
                    let cancel = cancel.clone();
                    tokio::spawn(async move {
                        if tokio::signal::ctrl_c().await.is_ok() {
                            cancel.cancel();
                        }
                    })
                };

                let report = dispatcher
                    .execute_with_cancel(&registry.snapshot(), &request, &cancel)
                    .await;
                watcher.abort();

                console.print_report(&report).await?;
            }

            MenuChoice::KillServer => match controller.inject_failure(registry).await {
                Ok(address) => {
                    console.say(&format!("Disconnected from {}", address)).await?;
                    console
                        .print_servers("Remaining servers", &registry.addresses())
                        .await?;
                }
                Err(e) => {
                    console.say(&format!("Too few servers, refusing: {}", e)).await?;
                }
            },

            MenuChoice::ListMembers => match controller.list_members(registry).await {
                Ok(members) => {
                    console.say("Current group members:").await?;
                    console.say(&members).await?;
                }
                Err(e) => console.say(&format!("Could not list members: {}", e)).await?,
            },

            MenuChoice::Leave => {
                let Some(address) = console.prompt_address("leaves").await? else {
                    break;
                };
                match controller.leave(registry, &address).await {
                    Ok(true) => {
                        console
                            .say(&format!("Disconnected from {}", address.trim()))
                            .await?;
                    }
                    Ok(false) => {}
                    Err(e) => console.say(&format!("Leave failed: {}", e)).await?,
                }
            }

            MenuChoice::Rejoin => {
                let Some(address) = console.prompt_address("rejoins").await? else {
                    break;
                };
                match controller.rejoin(registry, &address).await {
                    Ok(()) => {
                        if registry.position(address.trim()).is_none() {
                            match controller.reconnect(registry, &address).await {
                                Ok(()) => console
                                    .say(&format!("Reconnected to {}", address.trim()))
                                    .await?,
                                Err(e) => tracing::warn!(
                                    "Rejoin announced, but {} is not reachable: {}",
                                    address.trim(),
                                    e
                                ),
                            }
                        }
                    }
                    Err(e) => console.say(&format!("Rejoin failed: {}", e)).await?,
                }
            }

            MenuChoice::Exit => break,
        }
    }

    Ok(())
}
