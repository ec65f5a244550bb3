use log::debug;
use std::sync::Arc;

use crate::client::registry::{ClientRegistry, SlotId};
use crate::client::state::Outbound;
use crate::error::{ChatServerError, RoutingError, handle_error};
use crate::protocol::responses::{
    format_private_from, format_private_to, format_public, format_system,
};
use crate::protocol::{Message, parse_message};
use crate::storage::ChatLog;

/// The client a message came from.
///
/// The router writes private confirmations straight to `outbound` without
/// looking the sender up again.
pub struct Origin<'a> {
    pub slot: SlotId,
    pub name: &'a str,
    pub outbound: &'a Outbound,
}

/// What happened to one routed message
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Public chat or a server notice, with the number of clients it was queued for
    Broadcast { delivered: usize },
    /// A private message. The sender's confirmation is sent either way.
    Private { recipient: String, delivered: bool },
    Dropped(RoutingError),
}

/// Routes chat messages between the clients in a registry.
///
/// Every routed message is appended to exactly one log, however many clients
/// receive it.
pub struct Router {
    registry: Arc<ClientRegistry>,
    chat_log: Arc<ChatLog>,
}

impl Router {
    pub fn new(registry: Arc<ClientRegistry>, chat_log: Arc<ChatLog>) -> Self {
        Self { registry, chat_log }
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Classifies a client message and delivers it.
    pub async fn dispatch(&self, origin: &Origin<'_>, raw: &str) -> Dispatch {
        match parse_message(raw) {
            Message::Public(body) => {
                let line = format_public(origin.name, body);
                self.record_public(&line).await;
                let delivered = self.deliver_all(&line, Some(origin.slot)).await;
                Dispatch::Broadcast { delivered }
            }
            Message::Private { recipient, body } => {
                self.dispatch_private(origin, recipient, body).await
            }
            Message::Malformed => {
                let err = RoutingError::MalformedPrivate(raw.to_string());
                handle_error(&ChatServerError::Routing(err.clone()));
                Dispatch::Dropped(err)
            }
        }
    }

    /// Sends a `SERVER:` notice to every active client, with no exclusions.
    pub async fn announce(&self, text: &str) -> Dispatch {
        let line = format_system(text);
        self.record_public(&line).await;
        let delivered = self.deliver_all(&line, None).await;
        Dispatch::Broadcast { delivered }
    }

    async fn dispatch_private(&self, origin: &Origin<'_>, recipient: &str, body: &str) -> Dispatch {
        if let Err(e) = self
            .chat_log
            .append_private(origin.name, recipient, body)
            .await
        {
            handle_error(&e.into());
        }

        let delivered = match self.registry.find_by_name(recipient).await {
            Some(target) => target.outbound.send(format_private_from(origin.name, body)),
            None => false,
        };

        if !delivered {
            let miss = RoutingError::RoutingMiss(recipient.to_string());
            handle_error(&ChatServerError::Routing(miss));
        }

        // Confirmed regardless of delivery
        origin.outbound.send(format_private_to(recipient, body));

        Dispatch::Private {
            recipient: recipient.to_string(),
            delivered,
        }
    }

    /// Queues `line` for every active client except `skip`. The registry lock is
    /// released before anything is sent.
    async fn deliver_all(&self, line: &str, skip: Option<SlotId>) -> usize {
        let recipients = self.registry.snapshot().await;

        let mut delivered = 0;
        for recipient in recipients {
            if Some(recipient.slot) == skip {
                continue;
            }
            if recipient.outbound.send(line.to_string()) {
                delivered += 1;
            } else {
                debug!("Skipping {}: queue full or connection closed", recipient.name);
            }
        }
        delivered
    }

    async fn record_public(&self, line: &str) {
        if let Err(e) = self.chat_log.append_public(line).await {
            handle_error(&e.into());
        }
    }
}
