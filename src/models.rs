//! Shared data models used across modules
//!
//! Wire names follow the JSON the original web client speaks: camelCase for
//! video fields, the legacy `acesso_prof_usuario`/`taxId` profile fields, and
//! the Portuguese payment-webhook response keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEMO_ID_PREFIX;

/// Style category for generated videos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCategory {
    Timelapse,
    AnimatedCharacter,
    Motivational,
}

/// License kinds a catalog item can be purchased under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseKind {
    Common,
    /// Single-sale per item
    Exclusive,
}

/// Target platform for a scheduled post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
}

/// Lifecycle of a scheduled post. Nothing in this system ever moves an entry
/// out of `Pending`; see the scheduler module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Posted,
    Failed,
}

/// A catalog or library video
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub video_url: Option<String>,
    pub author: String,
    pub owner_id: String,
    pub is_public: bool,
    pub credits_common: i64,
    pub credits_exclusive: i64,
    pub is_exclusive_sold: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub tags: Option<Vec<String>>,
    #[sqlx(default)]
    pub category: Option<String>,
}

impl VideoItem {
    /// Cost of the given license in credits
    pub fn license_cost(&self, kind: LicenseKind) -> i64 {
        match kind {
            LicenseKind::Common => self.credits_common,
            LicenseKind::Exclusive => self.credits_exclusive,
        }
    }
}

/// A user profile as mirrored from the `profiles` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub credits: i64,
    /// Integer entitlement level; 3 unlocks the scheduler
    #[serde(rename = "acesso_prof_usuario")]
    pub access_tier: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "taxId", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Demo profiles are never persisted remotely
    pub fn is_demo(&self) -> bool {
        self.id.starts_with(DEMO_ID_PREFIX)
    }
}

/// A purchasable credit bundle, immutable once fetched
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub credits: i64,
    #[sqlx(default)]
    pub popular: bool,
    #[sqlx(default)]
    pub best_value: bool,
}

/// Response body from the payment webhook, passed through to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    #[serde(rename = "id_pagamento")]
    pub payment_id: String,
    /// Copy-pasteable payment code
    pub qrcode: String,
    /// Renderable image of the same code
    pub img_qrcode: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    pub status: String,
}

/// A locally registered social post. Purely session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub id: String,
    pub video_id: String,
    pub video_title: String,
    pub thumbnail: String,
    pub platform: Platform,
    pub scheduled_at: DateTime<Utc>,
    pub caption: String,
    pub status: PostStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(common: i64, exclusive: i64) -> VideoItem {
        VideoItem {
            id: "p-001".to_string(),
            title: "Cyberpunk Vertical".to_string(),
            thumbnail: "thumb".to_string(),
            video_url: None,
            author: "IA_Artist".to_string(),
            owner_id: "system".to_string(),
            is_public: true,
            credits_common: common,
            credits_exclusive: exclusive,
            is_exclusive_sold: false,
            created_at: Utc::now(),
            tags: None,
            category: None,
        }
    }

    #[test]
    fn test_license_cost_selects_price_field() {
        let v = item(10, 50);
        assert_eq!(v.license_cost(LicenseKind::Common), 10);
        assert_eq!(v.license_cost(LicenseKind::Exclusive), 50);
    }

    #[test]
    fn test_demo_profile_detection() {
        let mut profile = crate::constants::mock_users().remove(0);
        assert!(profile.is_demo());
        profile.id = "8f2c1c9a".to_string();
        assert!(!profile.is_demo());
    }
}
