//! Offer messages sent to clients through a deep link

use lavapro_common::{DeepLink, MessagingError};

use crate::model::{Client, Offer};

/// Greeting carrying `offer`, or a plain come-back reminder without one
pub fn compose_offer_message(client: &Client, offer: Option<&Offer>) -> String {
    match offer {
        Some(offer) => format!(
            "Olá {}! Temos uma oferta especial para você: {} ({}% de desconto). Apresente esta mensagem para garantir seu desconto. Aproveite!",
            client.name,
            offer.name,
            offer.discount_percentage.normalize()
        ),
        None => format!(
            "Olá {}! Passando para lembrar que estamos te esperando para a próxima lavagem!",
            client.name
        ),
    }
}

/// Link to the client's contact digits with `body` (possibly edited by the tenant)
pub fn offer_link(client: &Client, body: impl Into<String>) -> Result<DeepLink, MessagingError> {
    DeepLink::new(&client.contact, body)
}
