//! Bots that answer their turn with a random legal action.

use holdem_table::{
    entities::{Action, ActionKind, PlayerId},
    game::PrivateView,
    table::{TableHandle, TableNotification, TableResponse},
};
use log::{debug, warn};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IteratorRandom};
use tokio::sync::mpsc;

const NOTIFICATION_BUFFER: usize = 64;

/// Pick an action from the hints in `view`. Checks and calls are favoured
/// over folds so that hands regularly reach showdown.
pub fn choose_action<R: Rng>(view: &PrivateView, rng: &mut R) -> Option<Action> {
    let legal = &view.legal_actions;
    let roll: f64 = rng.random();
    let kind = if roll < 0.15 && legal.contains_kind(ActionKind::Raise) {
        ActionKind::Raise
    } else if roll < 0.15 && legal.contains_kind(ActionKind::Bet) {
        ActionKind::Bet
    } else if roll < 0.9 && legal.contains_kind(ActionKind::Check) {
        ActionKind::Check
    } else if roll < 0.9 && legal.contains_kind(ActionKind::Call) {
        ActionKind::Call
    } else {
        legal.0.iter().copied().choose(rng)?
    };

    let mut amount = || {
        let low = view.min_raise_to.unwrap_or(view.max_bet).min(view.max_bet);
        rng.random_range(low..=view.max_bet)
    };
    let action = match kind {
        ActionKind::Check => Action::Check,
        ActionKind::Call => Action::Call,
        ActionKind::Fold => Action::Fold,
        ActionKind::Bet => Action::Bet(amount()),
        ActionKind::Raise => Action::Raise(amount()),
    };
    Some(action)
}

/// Seat a bot and spawn its decision loop. The loop ends when the table
/// closes.
pub async fn spawn_bot(
    handle: TableHandle,
    player_id: PlayerId,
    buy_in: u32,
    seed: u64,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let notifications = handle
        .subscribe(player_id.clone(), NOTIFICATION_BUFFER)
        .await?;
    match handle.sit_down(player_id.clone(), buy_in, None).await? {
        TableResponse::Seated { seat } => debug!("{player_id} took seat {seat}"),
        other => anyhow::bail!("{player_id} couldn't sit down: {other:?}"),
    }
    let rng = StdRng::seed_from_u64(seed);
    Ok(tokio::spawn(run(handle, player_id, notifications, rng)))
}

async fn run(
    handle: TableHandle,
    player_id: PlayerId,
    mut notifications: mpsc::Receiver<TableNotification>,
    mut rng: StdRng,
) {
    while let Some(notification) = notifications.recv().await {
        let TableNotification::View(mut view) = notification else {
            continue;
        };
        // Act on the newest view only.
        while let Ok(next) = notifications.try_recv() {
            if let TableNotification::View(next) = next {
                view = next;
            }
        }
        let Some(private) = view.private.as_ref() else {
            continue;
        };
        let Some(action) = choose_action(private, &mut rng) else {
            continue;
        };

        match handle.take_action(player_id.clone(), action).await {
            Ok(TableResponse::Success | TableResponse::Stale) => {}
            Ok(TableResponse::Error(err)) => warn!("{player_id} tried to {action}: {err}"),
            Ok(other) => debug!("{player_id} got {other:?}"),
            Err(_) => break,
        }
    }
    debug!("{player_id} leaving the simulation");
}
