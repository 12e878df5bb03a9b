mod money;
mod secret;

pub use money::{Money, MoneyConversionError, STORE_CURRENCY_CODE};
pub use secret::Secret;
