//! The bridge event loop.
//!
//! One task owns every piece of mutable state (session, scheduler, current
//! connection) and reacts to whichever of these happens first:
//!
//! - the shutdown signal,
//! - an event from the current WebSocket connection,
//! - the reconnect supervisor tick,
//! - the scheduler's next deadline,
//! - a datagram arriving on the OSC socket.
//!
//! Nothing is shared between tasks, so no locks are needed.

use std::future::Future;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::application::scheduler::{OscTransmitter, OutputScheduler};
use crate::application::session::{Session, SessionAction};
use crate::domain::config::{BridgeConfig, TX_TARGET};
use crate::infrastructure::osc_udp::{
    bind_osc_socket, log_inbound, resolve_target, UdpOscTransmitter, MAX_DATAGRAM_SIZE,
};
use crate::infrastructure::stage_conn::{ConnectionEvent, StageConnection};

/// Runs the bridge until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error only during start-up: when the OSC socket cannot be bound
/// or the OSC target does not resolve.  Connection failures after that are
/// retried forever.
pub async fn run_bridge<F>(config: BridgeConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let socket = bind_osc_socket(config.osc.local_bind).await?;
    let target = resolve_target(&config.osc.host, config.osc.port).await?;
    let mut scheduler = OutputScheduler::new(
        config.groups.clone(),
        config.delays,
        UdpOscTransmitter::new(socket.sender.clone(), target),
    );

    let url = config.stage.url();
    info!("bridging {url} to OSC {target}");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ConnectionEvent>();
    let mut generation: u64 = 0;
    let mut session = Session::new(config.stage.password.clone());
    session.begin_connect();
    let mut connection = StageConnection::open(url.clone(), generation, events_tx.clone());

    let mut ticker = interval(config.reconnect_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut recv_buf = vec![0u8; MAX_DATAGRAM_SIZE];
    tokio::pin!(shutdown);

    loop {
        let deadline = scheduler.next_deadline();

        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }

            Some(event) = events_rx.recv() => {
                dispatch_event(&mut session, &mut scheduler, generation, event, |json| {
                    connection.send(json)
                });
            }

            _ = ticker.tick() => {
                if session.needs_reconnect() {
                    info!("Reconnecting...");
                    generation += 1;
                    session = Session::new(config.stage.password.clone());
                    session.begin_connect();
                    connection = StageConnection::open(url.clone(), generation, events_tx.clone());
                }
            }

            _ = sleep_until_deadline(deadline) => {
                scheduler.fire_due(Instant::now());
            }

            received = socket.receiver.recv_from(&mut recv_buf) => match received {
                Ok((n, from)) => log_inbound(&recv_buf[..n], from),
                // ICMP port-unreachable for an earlier send surfaces here on
                // some platforms.
                Err(e) => warn!("OSC receive failed: {e}"),
            },
        }
    }

    connection.shutdown().await;
    info!("bridge stopped");
    Ok(())
}

/// Feeds one connection event to the session and carries out its action.
///
/// Events tagged with a generation other than `current` come from a
/// connection that was already replaced; they are dropped untouched and the
/// function returns `false`.
fn dispatch_event<T: OscTransmitter>(
    session: &mut Session,
    scheduler: &mut OutputScheduler<T>,
    current: u64,
    event: ConnectionEvent,
    send: impl FnOnce(String),
) -> bool {
    let ConnectionEvent {
        generation: from,
        event,
    } = event;
    if from != current {
        debug!("ignoring event from stale connection {from}");
        return false;
    }
    match session.handle(event) {
        Some(SessionAction::Send(request)) => match request.to_json() {
            Ok(json) => {
                debug!(target: TX_TARGET, "-> {}", request.action_code());
                send(json);
            }
            Err(e) => error!("failed to encode {} request: {e}", request.action_code()),
        },
        Some(SessionAction::Route(pair)) => {
            scheduler.route(&pair.current, pair.next.as_deref(), Instant::now());
        }
        None => {}
    }
    true
}

/// Sleeps until `deadline`, or forever when there is none.
async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
