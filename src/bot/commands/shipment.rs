//! Shipment Discord command - record where an order is delivered.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::shipment::{self, NewShipment},
        errors::{Error, Result},
    };

    /// Records the shipping address of an order.
    #[poise::command(slash_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn ship(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "Person receiving the package"] recipient: String,
        #[description = "Street and number"] street: String,
        #[description = "City"] city: String,
        #[description = "State"] state: String,
        #[description = "Postal code"] postal_code: String,
        #[description = "Contact phone"] phone: String,
    ) -> Result<()> {
        let recorded = shipment::record_shipment(
            &ctx.data().database,
            NewShipment {
                order_id,
                recipient,
                street,
                city,
                state,
                postal_code,
                phone,
            },
        )
        .await?;

        ctx.say(format!(
            "📦 Order #{} ships to **{}**, {}, {}, {} {} (☎ {}).",
            recorded.order_id,
            recorded.recipient,
            recorded.street,
            recorded.city,
            recorded.state,
            recorded.postal_code,
            recorded.phone
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
