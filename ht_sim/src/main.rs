//! Bot-driven simulation of a single hold'em table.
//!
//! Seats a handful of random bots at one table actor, plays a fixed number
//! of hands and checks that no chips were created or destroyed.

mod bot;
mod config;

use anyhow::{Error, ensure};
use ctrlc::set_handler;
use holdem_table::{
    HandResult,
    entities::PlayerId,
    table::{TableActor, TableNotification},
};
use log::info;
use pico_args::Arguments;

use config::{HELP, SimConfig};

const OBSERVER_BUFFER: usize = 1024;

fn log_result(result: &HandResult) {
    let payouts = result
        .payouts
        .iter()
        .map(|payout| format!("{} +${}", payout.player_id, payout.amount))
        .collect::<Vec<_>>()
        .join(", ");
    let board = result
        .board
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    info!("hand #{} [{board}] {payouts}", result.hand_number);
    for reveal in &result.revealed {
        info!("  {} showed {}", reveal.player_id, reveal.hand);
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }
    let config = SimConfig::from_args(pargs)?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();
    info!(
        "simulating {} hands with {} bots at ${}/{}",
        config.hands, config.players, config.table.small_blind, config.table.big_blind
    );

    let buy_in = config.table.buy_in;
    let (actor, handle) = TableActor::new(config.table.clone());
    let actor = tokio::spawn(actor.run());
    let mut observer = handle
        .subscribe(PlayerId::from("observer"), OBSERVER_BUFFER)
        .await?;

    let base_seed = config.seed.unwrap_or_else(rand::random);
    let mut bots = Vec::with_capacity(config.players);
    for i in 0..config.players {
        let player_id = PlayerId::new(&format!("bot{i}"));
        let seed = base_seed.wrapping_add(i as u64);
        bots.push(bot::spawn_bot(handle.clone(), player_id, buy_in, seed).await?);
    }

    let mut hands_played = 0;
    let mut cashed_out: u64 = 0;
    while hands_played < config.hands {
        let Some(notification) = observer.recv().await else {
            break;
        };
        match notification {
            TableNotification::HandComplete(result) => {
                log_result(&result);
                hands_played += 1;
            }
            TableNotification::PlayerLeft {
                player_id,
                cash_out,
            } => {
                info!("{player_id} left with ${cash_out}");
                cashed_out += u64::from(cash_out);
            }
            TableNotification::View(view) => {
                let remaining = view.public.seats.iter().flatten().count();
                if remaining < 2 && view.public.current_round.is_none() {
                    info!("only {remaining} player left, stopping early");
                    break;
                }
            }
        }
    }

    let view = handle.view(None).await?;
    // Anything broadcast before the snapshot is already queued.
    while let Ok(notification) = observer.try_recv() {
        if let TableNotification::PlayerLeft { cash_out, .. } = notification {
            cashed_out += u64::from(cash_out);
        }
    }
    let stacks: u64 = view
        .public
        .seats
        .iter()
        .flatten()
        .map(|seat| u64::from(seat.stack))
        .sum();
    let in_play = stacks + u64::from(view.public.pot_total);
    let bought_in = u64::from(buy_in) * config.players as u64;
    ensure!(
        in_play + cashed_out == bought_in,
        "chips not conserved: {in_play} in play + {cashed_out} cashed out != {bought_in} bought in"
    );
    info!("{hands_played} hands played, {in_play} chips in play, {cashed_out} cashed out");

    for seat in view.public.seats.iter().flatten() {
        info!("  seat {}: {} with ${}", seat.seat, seat.player_id, seat.stack);
    }

    handle.close().await?;
    actor.await?;
    for bot in bots {
        bot.await?;
    }
    Ok(())
}
