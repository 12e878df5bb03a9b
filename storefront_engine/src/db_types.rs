use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sfs_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

/// The password column value for externally provisioned accounts. It is never a valid credential: login refuses
/// non-local providers before any comparison takes place.
pub const EXTERNAL_PASSWORD_SENTINEL: &str = "OAUTH2_USER";

//--------------------------------------        Role        ----------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::User => write!(f, "USER"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------      Provider      ----------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    #[default]
    Local,
    Google,
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Local => write!(f, "LOCAL"),
            Provider::Google => write!(f, "GOOGLE"),
        }
    }
}

impl FromStr for Provider {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCAL" => Ok(Self::Local),
            "GOOGLE" => Ok(Self::Google),
            s => Err(ConversionError(format!("Invalid provider: {s}"))),
        }
    }
}

//--------------------------------------        User        ----------------------------------------------------------
/// A principal record. The password column never leaves the server: the struct serializes without it, and admin
/// listings go through [`UserDto`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub provider: Provider,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Admin-facing update. A `None` password leaves the stored secret untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub role: Role,
    pub provider: Provider,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            name: u.name,
            avatar: u.avatar,
            role: u.role,
            provider: u.provider,
        }
    }
}

/// The profile handed over by an external identity provider after a successful login. Provisioning folds this into
/// the local user table with a single atomic upsert keyed on `email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalUserInfo {
    pub email: String,
    pub name: Option<String>,
    pub provider: Provider,
}

//--------------------------------------      Category      ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

//--------------------------------------      Product       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: i64,
    /// Gallery image urls. Replaces the existing gallery on update.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Filter for `GET /api/products/search`. Filters are applied in order of precedence: name, then category, then
/// price range, mirroring the original endpoint's behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQueryFilter {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
}

//--------------------------------------   OrderStatusType  ----------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been placed and no fulfilment has happened yet.
    #[default]
    Pending,
    /// The order has been fulfilled.
    Completed,
    /// The order has been cancelled by the user or an admin.
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "PENDING"),
            OrderStatusType::Completed => write!(f, "COMPLETED"),
            OrderStatusType::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------       Order        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_price: Money,
    pub status: OrderStatusType,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// An order as placed by a customer. Item quantities are keyed by product id; unit prices and the order total are
/// taken from the product table at placement time, never from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderRequest {
    pub items: BTreeMap<i64, i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

//--------------------------------------       Banner       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Banner {
    pub id: i64,
    pub image_url: String,
    pub link: Option<String>,
    pub section: String,
    pub active: bool,
    pub display_order: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBanner {
    pub image_url: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default = "default_banner_section")]
    pub section: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub display_order: i64,
}

fn default_banner_section() -> String {
    "HOME_SLIDER".to_string()
}

fn default_true() -> bool {
    true
}

//--------------------------------------        News        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNews {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

//--------------------------------------       Review       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub content: Option<String>,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub product_id: i64,
    #[serde(default)]
    pub content: Option<String>,
    pub rating: i64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_round_trip() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "USER");
        assert!("SUPERUSER".parse::<Role>().is_err());
    }

    #[test]
    fn order_status_round_trip() {
        for s in [OrderStatusType::Pending, OrderStatusType::Completed, OrderStatusType::Cancelled] {
            assert_eq!(s.to_string().parse::<OrderStatusType>().unwrap(), s);
        }
    }

    #[test]
    fn user_serializes_without_password() {
        let user = User {
            id: 1,
            username: "alice".into(),
            email: Some("alice@example.com".into()),
            password: "hunter2".into(),
            role: Role::User,
            provider: Provider::Local,
            name: None,
            avatar: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains(r#""username":"alice""#));
    }
}
