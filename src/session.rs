//! Per-user session state and the session registry
//!
//! Every flow handler receives an explicit [`Session`] instead of reaching
//! into shared globals. A session owns the credit-ledger mirror, the
//! personal library (including the owned-copy relation), and the scheduling
//! registry; its realtime credit feed is held by the registry entry so that
//! replacing or removing a session releases the subscription.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::constants::{COST_PRIVATE, COST_PUBLIC, PREMIUM_TIER};
use crate::models::{
    LicenseKind, Platform, PostStatus, ScheduledPost, UserProfile, VideoCategory, VideoItem,
};
use crate::services::ledger::{CreditLedger, InsufficientCredits};
use crate::services::production::{PLACEHOLDER_THUMBNAIL, placeholder_video};
use crate::services::realtime::CreditFeed;
use crate::services::tokens;

/// In-memory state for one signed-in user
pub struct Session {
    pub profile: UserProfile,
    pub ledger: CreditLedger,
    /// Personal library; newest productions go to the head
    pub library: Vec<VideoItem>,
    /// Owned-copy relation: catalog id -> ids of copies purchased from it
    pub owned_copies: HashMap<String, Vec<String>>,
    /// Local scheduling registry; entries never leave `Pending`
    pub scheduled_posts: Vec<ScheduledPost>,
}

#[derive(Debug)]
pub enum PurchaseError {
    /// The exclusive license was already sold; the selection guard rejects it
    ExclusiveSold,
    Insufficient(InsufficientCredits),
}

impl std::fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseError::ExclusiveSold => write!(f, "exclusive license already sold"),
            PurchaseError::Insufficient(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScheduleError {
    /// Scheduling is gated on the premium access tier
    PremiumRequired,
    /// The referenced video is not in this session's library
    UnknownVideo,
    /// Scheduled time must be in the future
    PastTimestamp,
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::PremiumRequired => write!(f, "scheduling requires a premium profile"),
            ScheduleError::UnknownVideo => write!(f, "video not found in library"),
            ScheduleError::PastTimestamp => write!(f, "scheduled time must be in the future"),
        }
    }
}

/// Validate a license selection against the item and return its cost
pub fn license_checkout(item: &VideoItem, kind: LicenseKind) -> Result<i64, PurchaseError> {
    if kind == LicenseKind::Exclusive && item.is_exclusive_sold {
        return Err(PurchaseError::ExclusiveSold);
    }
    Ok(item.license_cost(kind))
}

impl Session {
    pub fn new(profile: UserProfile) -> Self {
        let ledger = CreditLedger::new(profile.id.clone(), profile.credits);
        Self {
            profile,
            ledger,
            library: Vec::new(),
            owned_copies: HashMap::new(),
            scheduled_posts: Vec::new(),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.profile.is_demo()
    }

    /// Whether any library entry is a copy purchased from this catalog item
    pub fn is_owned(&self, catalog_id: &str) -> bool {
        self.owned_copies
            .get(catalog_id)
            .is_some_and(|copies| !copies.is_empty())
    }

    /// Public items are always free to view and download; otherwise the
    /// caller must own a copy
    pub fn can_download(&self, item: &VideoItem) -> bool {
        item.is_public || self.is_owned(&item.id)
    }

    /// Append a purchased copy of a catalog item to the library and record
    /// the owned-copy relation. The copy gets a derived id.
    pub fn add_purchased_copy(&mut self, item: &VideoItem) -> VideoItem {
        let mut copy = item.clone();
        copy.id = format!("{}-copy-{}", item.id, Utc::now().timestamp_millis());
        self.owned_copies
            .entry(item.id.clone())
            .or_default()
            .push(copy.id.clone());
        self.library.push(copy.clone());
        copy
    }

    /// Purchase entirely against the local ledger. This is the demo path;
    /// persisted users spend through the store first and then call
    /// [`Session::add_purchased_copy`].
    pub fn purchase_local(
        &mut self,
        item: &VideoItem,
        kind: LicenseKind,
    ) -> Result<VideoItem, PurchaseError> {
        let cost = license_checkout(item, kind)?;
        self.ledger
            .try_spend_local(cost)
            .map_err(PurchaseError::Insufficient)?;
        Ok(self.add_purchased_copy(item))
    }

    /// Synthesize the placeholder item for an accepted production request
    /// and insert it at the head of the library. The external generator is
    /// expected to publish the real asset through its own channel; nothing
    /// here ever swaps the placeholder out.
    pub fn register_production(
        &mut self,
        prompt: &str,
        category: VideoCategory,
        is_public: bool,
    ) -> VideoItem {
        let excerpt: String = prompt.chars().take(15).collect();
        let category_tag = match category {
            VideoCategory::Timelapse => "timelapse",
            VideoCategory::AnimatedCharacter => "animated_character",
            VideoCategory::Motivational => "motivational",
        };

        let item = VideoItem {
            id: format!("prod-{}", Utc::now().timestamp_millis()),
            title: format!("Creation: {}...", excerpt),
            thumbnail: PLACEHOLDER_THUMBNAIL.to_string(),
            video_url: Some(placeholder_video(category).to_string()),
            author: self.profile.display_name.clone(),
            owner_id: self.profile.id.clone(),
            is_public,
            credits_common: COST_PUBLIC,
            credits_exclusive: COST_PRIVATE,
            is_exclusive_sold: !is_public,
            created_at: Utc::now(),
            tags: Some(vec![
                "ai".to_string(),
                category_tag.to_string(),
                if is_public { "public" } else { "exclusive" }.to_string(),
            ]),
            category: Some(category_tag.to_string()),
        };

        self.library.insert(0, item.clone());
        item
    }

    /// Register a social post. Entries are created `Pending` and never
    /// executed; no background dispatcher exists.
    pub fn schedule_post(
        &mut self,
        video_id: &str,
        platform: Platform,
        scheduled_at: DateTime<Utc>,
        caption: &str,
        now: DateTime<Utc>,
    ) -> Result<ScheduledPost, ScheduleError> {
        if self.profile.access_tier != PREMIUM_TIER {
            return Err(ScheduleError::PremiumRequired);
        }
        let video = self
            .library
            .iter()
            .find(|v| v.id == video_id)
            .ok_or(ScheduleError::UnknownVideo)?;
        if scheduled_at <= now {
            return Err(ScheduleError::PastTimestamp);
        }

        let post = ScheduledPost {
            id: tokens::generate_opaque_id(),
            video_id: video.id.clone(),
            video_title: video.title.clone(),
            thumbnail: video.thumbnail.clone(),
            platform,
            scheduled_at,
            caption: caption.to_string(),
            status: PostStatus::Pending,
        };
        self.scheduled_posts.insert(0, post.clone());
        Ok(post)
    }

    /// Remove a scheduled post; returns whether anything was deleted
    pub fn remove_scheduled(&mut self, post_id: &str) -> bool {
        let before = self.scheduled_posts.len();
        self.scheduled_posts.retain(|p| p.id != post_id);
        self.scheduled_posts.len() != before
    }
}

struct SessionEntry {
    session: Arc<RwLock<Session>>,
    // Dropped (and the LISTEN task aborted) with the entry
    feed: Option<CreditFeed>,
}

/// Registry of live sessions, one per user id. Re-login replaces the entry,
/// which tears down the previous credit feed.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the session for a user, without a feed
    pub async fn insert(&self, session: Session) -> Arc<RwLock<Session>> {
        let user_id = session.profile.id.clone();
        let session = Arc::new(RwLock::new(session));
        self.inner.write().await.insert(
            user_id,
            SessionEntry {
                session: Arc::clone(&session),
                feed: None,
            },
        );
        session
    }

    /// Attach the realtime credit feed, but only while the entry still
    /// holds the session the feed was opened against. A feed arriving after
    /// a concurrent re-login replaced the entry is dropped instead, which
    /// aborts its listener; the replacing login attaches its own. Returns
    /// whether the feed was attached.
    pub async fn set_feed(
        &self,
        user_id: &str,
        session: &Arc<RwLock<Session>>,
        feed: CreditFeed,
    ) -> bool {
        if let Some(entry) = self.inner.write().await.get_mut(user_id) {
            if Arc::ptr_eq(&entry.session, session) {
                entry.feed = Some(feed);
                return true;
            }
        }
        false
    }

    pub async fn get(&self, user_id: &str) -> Option<Arc<RwLock<Session>>> {
        self.inner
            .read()
            .await
            .get(user_id)
            .map(|entry| Arc::clone(&entry.session))
    }

    /// Drop the session and its subscription; returns whether one existed
    pub async fn remove(&self, user_id: &str) -> bool {
        self.inner.write().await.remove(user_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEMO_CREDITS;
    use chrono::Duration;

    fn demo_profile(credits: i64, access_tier: i32) -> UserProfile {
        UserProfile {
            id: "mock-eunice".to_string(),
            display_name: "Eunice".to_string(),
            email: Some("eunice@demo.com".to_string()),
            credits,
            access_tier,
            phone: None,
            tax_id: None,
            avatar_url: None,
        }
    }

    fn catalog_item(id: &str, common: i64, exclusive: i64, sold: bool) -> VideoItem {
        VideoItem {
            id: id.to_string(),
            title: "Cyberpunk Vertical".to_string(),
            thumbnail: "https://picsum.photos/seed/cyber/400/711".to_string(),
            video_url: Some("https://example.com/clip.mp4".to_string()),
            author: "IA_Artist".to_string(),
            owner_id: "system".to_string(),
            is_public: true,
            credits_common: common,
            credits_exclusive: exclusive,
            is_exclusive_sold: sold,
            created_at: Utc::now(),
            tags: None,
            category: None,
        }
    }

    #[test]
    fn test_purchase_appends_copy_and_debits() {
        let mut session = Session::new(demo_profile(100, 3));
        let item = catalog_item("p-001", 10, 50, false);

        let copy = session
            .purchase_local(&item, LicenseKind::Common)
            .expect("purchase");

        assert_eq!(session.ledger.balance(), 90);
        assert_eq!(session.library.len(), 1);
        assert!(copy.id.starts_with("p-001-copy-"));
        assert!(session.is_owned("p-001"));
        assert!(!session.is_owned("p-002"));
    }

    #[test]
    fn test_purchase_insufficient_redirects_with_state_intact() {
        let mut session = Session::new(demo_profile(5, 3));
        let item = catalog_item("p-001", 10, 50, false);

        let err = session
            .purchase_local(&item, LicenseKind::Common)
            .expect_err("must fail");
        assert!(matches!(
            err,
            PurchaseError::Insufficient(InsufficientCredits {
                balance: 5,
                required: 10
            })
        ));
        assert_eq!(session.ledger.balance(), 5);
        assert!(session.library.is_empty());
        assert!(!session.is_owned("p-001"));
    }

    #[test]
    fn test_sold_exclusive_is_unreachable() {
        let mut session = Session::new(demo_profile(DEMO_CREDITS, 3));
        let item = catalog_item("p-001", 10, 50, true);

        assert!(matches!(
            session.purchase_local(&item, LicenseKind::Exclusive),
            Err(PurchaseError::ExclusiveSold)
        ));
        // The common license on the same item is still purchasable
        assert!(session.purchase_local(&item, LicenseKind::Common).is_ok());
    }

    #[test]
    fn test_public_item_downloadable_at_zero_balance() {
        let session = Session::new(demo_profile(0, 1));
        let item = catalog_item("p-001", 10, 50, false);
        assert!(session.can_download(&item));
    }

    #[test]
    fn test_private_item_requires_owned_copy() {
        let mut session = Session::new(demo_profile(100, 3));
        let mut item = catalog_item("p-007", 10, 50, false);
        item.is_public = false;

        assert!(!session.can_download(&item));
        session
            .purchase_local(&item, LicenseKind::Common)
            .expect("purchase");
        assert!(session.can_download(&item));
    }

    #[test]
    fn test_production_inserts_at_head_and_drains_balance() {
        let mut session = Session::new(demo_profile(10, 3));
        session.library.push(catalog_item("old", 10, 50, false));

        session.ledger.try_spend_local(COST_PUBLIC).expect("spend");
        let item = session.register_production("um céu estrelado sobre montanhas", VideoCategory::Timelapse, true);

        assert_eq!(session.ledger.balance(), 0);
        assert_eq!(session.library.first().map(|v| v.id.as_str()), Some(item.id.as_str()));
        assert!(item.id.starts_with("prod-"));
        assert!(item.video_url.is_some());
        assert!(!item.is_exclusive_sold, "public productions stay sellable");
    }

    #[test]
    fn test_private_production_marks_exclusive() {
        let mut session = Session::new(demo_profile(50, 3));
        let item = session.register_production("só para mim", VideoCategory::Motivational, false);
        assert!(!item.is_public);
        assert!(item.is_exclusive_sold);
    }

    #[test]
    fn test_schedule_requires_premium_tier() {
        let mut session = Session::new(demo_profile(0, 1));
        session.library.push(catalog_item("p-001", 10, 50, false));

        let err = session
            .schedule_post(
                "p-001",
                Platform::Instagram,
                Utc::now() + Duration::hours(1),
                "caption",
                Utc::now(),
            )
            .expect_err("tier 1 must be rejected");
        assert_eq!(err, ScheduleError::PremiumRequired);
    }

    #[test]
    fn test_schedule_pending_and_listed_head_first() {
        let mut session = Session::new(demo_profile(0, 3));
        session.library.push(catalog_item("p-001", 10, 50, false));
        let now = Utc::now();

        let first = session
            .schedule_post("p-001", Platform::Tiktok, now + Duration::hours(1), "a", now)
            .expect("schedule");
        let second = session
            .schedule_post("p-001", Platform::Youtube, now + Duration::hours(2), "b", now)
            .expect("schedule");

        assert_eq!(first.status, PostStatus::Pending);
        assert_eq!(
            session.scheduled_posts.first().map(|p| p.id.as_str()),
            Some(second.id.as_str())
        );
        assert!(session.remove_scheduled(&first.id));
        assert!(!session.remove_scheduled(&first.id));
    }

    #[test]
    fn test_schedule_rejects_past_and_unknown() {
        let mut session = Session::new(demo_profile(0, 3));
        session.library.push(catalog_item("p-001", 10, 50, false));
        let now = Utc::now();

        assert_eq!(
            session.schedule_post("p-404", Platform::Instagram, now + Duration::hours(1), "", now),
            Err(ScheduleError::UnknownVideo)
        );
        assert_eq!(
            session.schedule_post("p-001", Platform::Instagram, now - Duration::minutes(1), "", now),
            Err(ScheduleError::PastTimestamp)
        );
        assert!(session.scheduled_posts.is_empty());
    }

    #[tokio::test]
    async fn test_store_replaces_session_on_relogin() {
        let store = SessionStore::new();
        let first = store.insert(Session::new(demo_profile(100, 3))).await;
        first.write().await.ledger.try_spend_local(40).expect("spend");

        // Re-login starts from the profile again
        let second = store.insert(Session::new(demo_profile(100, 3))).await;
        assert_eq!(second.read().await.ledger.balance(), 100);

        let fetched = store.get("mock-eunice").await.expect("present");
        assert_eq!(fetched.read().await.ledger.balance(), 100);

        assert!(store.remove("mock-eunice").await);
        assert!(store.get("mock-eunice").await.is_none());
    }

    #[tokio::test]
    async fn test_feed_from_replaced_session_is_not_attached() {
        let store = SessionStore::new();
        let first = store.insert(Session::new(demo_profile(100, 3))).await;
        // A second login replaces the entry while the first is still
        // opening its subscription
        let second = store.insert(Session::new(demo_profile(100, 3))).await;

        assert!(
            !store
                .set_feed("mock-eunice", &first, CreditFeed::idle())
                .await
        );
        assert!(
            store
                .set_feed("mock-eunice", &second, CreditFeed::idle())
                .await
        );
    }
}
