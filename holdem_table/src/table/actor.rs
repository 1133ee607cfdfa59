//! Table actor implementation with async message handling.

use super::{
    config::TableConfig,
    messages::{ActionIntent, HandleError, TableMessage, TableNotification, TableResponse},
};
use crate::game::{
    StandUpOutcome, Table, TableError, TableEvent, TableView, TurnKey,
    entities::{Action, Chips, PlayerId, SeatIndex},
};
use log::{debug, info, warn};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::sleep,
};

const INBOX_SIZE: usize = 100;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
}

impl TableHandle {
    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), HandleError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| HandleError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> Result<T, HandleError> {
        let (response, receiver) = oneshot::channel();
        self.send(build(response)).await?;
        receiver.await.map_err(|_| HandleError::Closed)
    }

    pub async fn sit_down(
        &self,
        player_id: PlayerId,
        buy_in: Chips,
        seat: Option<SeatIndex>,
    ) -> Result<TableResponse, HandleError> {
        self.request(|response| TableMessage::SitDown {
            player_id,
            buy_in,
            seat,
            response,
        })
        .await
    }

    pub async fn stand_up(&self, player_id: PlayerId) -> Result<TableResponse, HandleError> {
        self.request(|response| TableMessage::StandUp {
            player_id,
            response,
        })
        .await
    }

    /// Resolves once the action has been applied, rejected or discarded
    /// as stale.
    pub async fn take_action(
        &self,
        player_id: PlayerId,
        intent: impl Into<ActionIntent>,
    ) -> Result<TableResponse, HandleError> {
        let intent = intent.into();
        self.request(|response| TableMessage::TakeAction {
            player_id,
            intent,
            response,
        })
        .await
    }

    pub async fn view(&self, player_id: Option<PlayerId>) -> Result<TableView, HandleError> {
        self.request(|response| TableMessage::GetView {
            player_id,
            response,
        })
        .await
    }

    pub async fn deal_hand(&self) -> Result<TableResponse, HandleError> {
        self.request(|response| TableMessage::DealHand { response })
            .await
    }

    /// Start receiving notifications. The current view arrives first.
    pub async fn subscribe(
        &self,
        player_id: PlayerId,
        buffer: usize,
    ) -> Result<mpsc::Receiver<TableNotification>, HandleError> {
        let (sender, receiver) = mpsc::channel(buffer);
        self.send(TableMessage::Subscribe { player_id, sender })
            .await?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, player_id: PlayerId) -> Result<(), HandleError> {
        self.send(TableMessage::Unsubscribe { player_id }).await
    }

    pub async fn restart(&self) -> Result<TableResponse, HandleError> {
        self.request(|response| TableMessage::Restart { response })
            .await
    }

    pub async fn close(&self) -> Result<TableResponse, HandleError> {
        self.request(|response| TableMessage::Close { response })
            .await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// An accepted action waiting out the pacing delay.
struct PendingAction {
    ticket: u64,
    key: TurnKey,
    player_id: PlayerId,
    action: Action,
    response: oneshot::Sender<TableResponse>,
}

/// Table actor owning a single poker table
pub struct TableActor {
    /// Table configuration
    config: TableConfig,

    table: Table,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Timer tasks post back through this without keeping the inbox open
    loopback: mpsc::WeakSender<TableMessage>,

    /// Subscribers for table notifications
    subscribers: HashMap<PlayerId, mpsc::Sender<TableNotification>>,

    pending: Option<PendingAction>,

    next_ticket: u64,

    /// Timeout for the turn in progress
    turn_timer: Option<(TurnKey, JoinHandle<()>)>,

    next_hand_timer: Option<JoinHandle<()>>,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_SIZE);
        let table = Table::new(config.table_settings());

        let actor = Self {
            config,
            table,
            inbox,
            loopback: sender.downgrade(),
            subscribers: HashMap::new(),
            pending: None,
            next_ticket: 0,
            turn_timer: None,
            next_hand_timer: None,
            is_closed: false,
        };

        (actor, TableHandle { sender })
    }

    /// Run the table actor event loop until closed or every handle is
    /// dropped.
    pub async fn run(mut self) {
        info!("table '{}' starting", self.config.name);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
            if self.is_closed {
                break;
            }
        }

        self.cancel_timers();
        if let Some(pending) = self.pending.take() {
            let _ = pending.response.send(TableResponse::Stale);
        }
        info!("table '{}' closed", self.config.name);
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::SitDown {
                player_id,
                buy_in,
                seat,
                response,
            } => {
                let result = match self.table.sit_down(player_id, buy_in, seat) {
                    Ok(seat) => TableResponse::Seated { seat },
                    Err(err) => TableResponse::Error(err),
                };
                let _ = response.send(result);
                self.after_change();
            }

            TableMessage::StandUp {
                player_id,
                response,
            } => {
                let result = match self.table.stand_up(&player_id) {
                    Ok(StandUpOutcome::Left { cash_out }) => TableResponse::Left { cash_out },
                    Ok(StandUpOutcome::Queued) => TableResponse::LeaveQueued,
                    Err(err) => TableResponse::Error(err),
                };
                let _ = response.send(result);
                self.after_change();
            }

            TableMessage::TakeAction {
                player_id,
                intent,
                response,
            } => self.handle_action(player_id, intent, response),

            TableMessage::GetView {
                player_id,
                response,
            } => {
                let _ = response.send(self.table.view_for(player_id.as_ref()));
            }

            TableMessage::DealHand { response } => {
                let _ = response.send(self.table.deal_cards().into());
                self.after_change();
            }

            TableMessage::Subscribe { player_id, sender } => {
                let view = self.table.view_for(Some(&player_id));
                if deliver(&player_id, &sender, TableNotification::View(view)) {
                    debug!("{player_id} subscribed to table '{}'", self.config.name);
                    self.subscribers.insert(player_id, sender);
                }
            }

            TableMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                debug!("{player_id} unsubscribed from table '{}'", self.config.name);
            }

            TableMessage::Restart { response } => {
                self.cancel_timers();
                if let Some(pending) = self.pending.take() {
                    let _ = pending.response.send(TableResponse::Stale);
                }
                self.table = self.table.restarted();
                info!("table '{}' restarted", self.config.name);
                let _ = response.send(TableResponse::Success);
                self.after_change();
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(TableResponse::Success);
            }

            TableMessage::ApplyPending { ticket } => self.apply_pending(ticket),

            TableMessage::TurnTimeout { key } => self.handle_timeout(key),

            TableMessage::NextHand => {
                self.next_hand_timer = None;
                self.after_change();
            }
        }
    }

    fn handle_action(
        &mut self,
        player_id: PlayerId,
        intent: ActionIntent,
        response: oneshot::Sender<TableResponse>,
    ) {
        let action = match intent.to_action() {
            Ok(action) => action,
            Err(err) => {
                self.reject(&player_id, err, response);
                return;
            }
        };
        if let Err(err) = self.table.ensure_turn(&player_id) {
            let _ = response.send(TableResponse::Error(err));
            return;
        }
        let Some(key) = self.table.turn_key() else {
            let _ = response.send(TableResponse::Error(TableError::NoHandInProgress));
            return;
        };

        if let Some(pending) = self.pending.take() {
            if pending.key == key {
                // The turn is already spoken for.
                self.pending = Some(pending);
                let _ = response.send(TableResponse::Stale);
                return;
            }
            let _ = pending.response.send(TableResponse::Stale);
        }

        let delay = self.config.action_delay();
        if delay.is_zero() {
            self.apply(&player_id, action, response);
            return;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        debug!("{player_id} {action} in {delay:?}");
        self.pending = Some(PendingAction {
            ticket,
            key,
            player_id,
            action,
            response,
        });
        // Detached: a stale ticket is ignored when it arrives.
        drop(self.schedule(delay, TableMessage::ApplyPending { ticket }));
    }

    fn apply_pending(&mut self, ticket: u64) {
        let Some(pending) = self.pending.take_if(|pending| pending.ticket == ticket) else {
            return;
        };
        if self.table.turn_key() != Some(pending.key) {
            debug!("discarding stale action from {}", pending.player_id);
            let _ = pending.response.send(TableResponse::Stale);
            return;
        }
        self.apply(&pending.player_id, pending.action, pending.response);
    }

    fn apply(
        &mut self,
        player_id: &PlayerId,
        action: Action,
        response: oneshot::Sender<TableResponse>,
    ) {
        match self.table.act(player_id, action) {
            Ok(()) => {
                let _ = response.send(TableResponse::Success);
                self.after_change();
            }
            Err(err) => self.reject(player_id, err, response),
        }
    }

    /// Report an invalid action and, if configured, fold the player so the
    /// hand doesn't stall.
    fn reject(
        &mut self,
        player_id: &PlayerId,
        err: TableError,
        response: oneshot::Sender<TableResponse>,
    ) {
        warn!("rejected action from {player_id}: {err}");
        let fold = self.config.fold_on_invalid_action
            && err != TableError::OutOfTurn
            && self.table.ensure_turn(player_id).is_ok();
        let _ = response.send(TableResponse::Error(err));
        if fold {
            warn!("folding {player_id} after an invalid action");
            if let Err(err) = self.table.act(player_id, Action::Fold) {
                warn!("couldn't fold {player_id}: {err}");
            }
            self.after_change();
        }
    }

    fn handle_timeout(&mut self, key: TurnKey) {
        if self.turn_timer.as_ref().is_some_and(|(k, _)| *k == key) {
            self.turn_timer = None;
        }
        if self.table.turn_key() != Some(key) {
            return;
        }
        let Some(player_id) = self.table.current_actor().map(|p| p.id.clone()) else {
            return;
        };
        info!("{player_id} ran out of time");
        if let Err(err) = self.table.act(&player_id, Action::Fold) {
            warn!("couldn't fold {player_id}: {err}");
        }
        self.after_change();
    }

    /// Fan out what happened, start the next hand if one is due, and keep
    /// the turn timer in step with the table.
    fn after_change(&mut self) {
        self.publish_events();

        if self.config.auto_start
            && !self.table.is_hand_in_progress()
            && self.next_hand_timer.is_none()
            && self.funded_players() >= 2
        {
            match self.table.deal_cards() {
                Ok(()) => self.publish_events(),
                Err(err) => warn!("couldn't deal: {err}"),
            }
        }

        self.reset_turn_timer();
        self.broadcast_views();
    }

    fn funded_players(&self) -> usize {
        self.table
            .seats()
            .iter()
            .flatten()
            .filter(|p| p.stack > 0)
            .count()
    }

    fn publish_events(&mut self) {
        for event in self.table.drain_events() {
            debug!("table '{}': {event}", self.config.name);
            match event {
                TableEvent::HandComplete(result) => {
                    self.broadcast(&TableNotification::HandComplete(result));
                    self.schedule_next_hand();
                }
                TableEvent::StoodUp {
                    player_id,
                    cash_out,
                } => {
                    self.broadcast(&TableNotification::PlayerLeft {
                        player_id,
                        cash_out,
                    });
                }
                _ => {}
            }
        }
    }

    fn schedule_next_hand(&mut self) {
        if !self.config.auto_start {
            return;
        }
        if let Some(timer) = self.next_hand_timer.take() {
            timer.abort();
        }
        let timer = self.schedule(self.config.next_hand_delay(), TableMessage::NextHand);
        self.next_hand_timer = Some(timer);
    }

    /// Cancel the running turn timer whenever the turn changes and start
    /// one for the new turn.
    fn reset_turn_timer(&mut self) {
        let key = self.table.turn_key();
        if self.turn_timer.as_ref().map(|(k, _)| *k) == key {
            return;
        }
        if let Some((_, timer)) = self.turn_timer.take() {
            timer.abort();
        }
        if let (Some(key), Some(timeout)) = (key, self.config.action_timeout()) {
            let timer = self.schedule(timeout, TableMessage::TurnTimeout { key });
            self.turn_timer = Some((key, timer));
        }
    }

    fn cancel_timers(&mut self) {
        if let Some((_, timer)) = self.turn_timer.take() {
            timer.abort();
        }
        if let Some(timer) = self.next_hand_timer.take() {
            timer.abort();
        }
    }

    fn schedule(&self, delay: Duration, message: TableMessage) -> JoinHandle<()> {
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            if let Some(sender) = loopback.upgrade() {
                let _ = sender.send(message).await;
            }
        })
    }

    fn broadcast(&mut self, notification: &TableNotification) {
        self.subscribers
            .retain(|player_id, sender| deliver(player_id, sender, notification.clone()));
    }

    /// Send every subscriber their own view, sharing one public part.
    fn broadcast_views(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let public = Arc::new(self.table.public_view());
        let table = &self.table;
        self.subscribers.retain(|player_id, sender| {
            let view = TableView {
                public: Arc::clone(&public),
                private: table.private_view(player_id),
            };
            deliver(player_id, sender, TableNotification::View(view))
        });
    }
}

/// Returns whether the subscriber should be kept.
fn deliver(
    player_id: &PlayerId,
    sender: &mpsc::Sender<TableNotification>,
    notification: TableNotification,
) -> bool {
    match sender.try_send(notification) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("subscriber {player_id} channel full, dropping notification");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("subscriber {player_id} disconnected, removing");
            false
        }
    }
}
