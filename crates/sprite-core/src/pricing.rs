//! Pricing Catalog
//!
//! The subscription tiers and credit packs offered on the site, plus the
//! reverse index that maps a Stripe price identifier back to the tier and
//! billing interval it belongs to.
//!
//! The catalog is configuration data: it is built once at start-up (price ids
//! come from the environment) and only read afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Subscription tier identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierId {
    Free,
    Basic,
    Indie,
    Studio,
}

impl TierId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Indie => "indie",
            Self::Studio => "studio",
        }
    }

    /// Parse a tier id; unknown ids yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "basic" => Some(Self::Basic),
            "indie" => Some(Self::Indie),
            "studio" => Some(Self::Studio),
            _ => None,
        }
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing interval of a subscription price
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    #[default]
    Monthly,
    Yearly,
}

impl BillingInterval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Short suffix shown after a price ("/mo", "/yr")
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Monthly => "mo",
            Self::Yearly => "yr",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Monthly => Self::Yearly,
            Self::Yearly => Self::Monthly,
        }
    }
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checkout purchase mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseMode {
    /// Recurring subscription to a tier
    #[default]
    Subscription,
    /// One-time payment (credit packs)
    Payment,
}

impl PurchaseMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Payment => "payment",
        }
    }
}

/// Price of a tier for one billing interval
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceOption {
    /// Stripe price id (`None` when not configured or free)
    pub price_id: Option<String>,

    /// Amount in cents (`None` for the free tier)
    pub amount: Option<i64>,

    /// Discount compared to paying monthly, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u8>,
}

impl PriceOption {
    fn paid(price_id: Option<String>, amount: i64) -> Self {
        Self {
            price_id,
            amount: Some(amount),
            discount: None,
        }
    }

    fn with_discount(mut self, percent: u8) -> Self {
        self.discount = Some(percent);
        self
    }
}

/// Monthly and yearly prices of a tier
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPricing {
    pub monthly: PriceOption,
    pub yearly: PriceOption,
}

impl TierPricing {
    pub const fn get(&self, interval: BillingInterval) -> &PriceOption {
        match interval {
            BillingInterval::Monthly => &self.monthly,
            BillingInterval::Yearly => &self.yearly,
        }
    }
}

/// A subscription plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub id: TierId,
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    pub popular: bool,
    pub credits: u32,
    pub pricing: TierPricing,
}

impl PricingTier {
    pub const fn price(&self, interval: BillingInterval) -> &PriceOption {
        self.pricing.get(interval)
    }

    /// A tier without an amount for either interval is the free tier
    pub const fn is_free(&self) -> bool {
        self.pricing.monthly.amount.is_none() && self.pricing.yearly.amount.is_none()
    }
}

/// A one-time credit top-up
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPack {
    pub id: String,
    pub name: String,
    pub description: String,
    pub credits: u32,
    /// Price in cents
    pub price: i64,
    pub price_id: Option<String>,
}

/// Stripe price ids, read from the environment
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriceIds {
    pub basic_monthly: Option<String>,
    pub basic_yearly: Option<String>,
    pub indie_monthly: Option<String>,
    pub indie_yearly: Option<String>,
    pub studio_monthly: Option<String>,
    pub studio_yearly: Option<String>,
    pub credit_pack_1000: Option<String>,
    pub credit_pack_2500: Option<String>,
    pub credit_pack_5000: Option<String>,
}

impl PriceIds {
    /// Read from `STRIPE_PRICE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            basic_monthly: get("STRIPE_PRICE_BASIC_MONTHLY"),
            basic_yearly: get("STRIPE_PRICE_BASIC_YEARLY"),
            indie_monthly: get("STRIPE_PRICE_INDIE_MONTHLY"),
            indie_yearly: get("STRIPE_PRICE_INDIE_YEARLY"),
            studio_monthly: get("STRIPE_PRICE_STUDIO_MONTHLY"),
            studio_yearly: get("STRIPE_PRICE_STUDIO_YEARLY"),
            credit_pack_1000: get("STRIPE_PRICE_CREDIT_PACK_1000"),
            credit_pack_2500: get("STRIPE_PRICE_CREDIT_PACK_2500"),
            credit_pack_5000: get("STRIPE_PRICE_CREDIT_PACK_5000"),
        }
    }
}

/// Result of resolving a price id
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceLookup<'a> {
    pub tier: Option<&'a PricingTier>,
    pub interval: Option<BillingInterval>,
}

impl PriceLookup<'_> {
    const NOT_FOUND: Self = Self {
        tier: None,
        interval: None,
    };
}

/// What a checkout for a given price id would buy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purchase<'a> {
    Subscription {
        tier: &'a PricingTier,
        interval: BillingInterval,
    },
    CreditPack(&'a CreditPack),
}

impl Purchase<'_> {
    pub const fn mode(&self) -> PurchaseMode {
        match self {
            Self::Subscription { .. } => PurchaseMode::Subscription,
            Self::CreditPack(_) => PurchaseMode::Payment,
        }
    }

    /// Label used in checkout metadata and logs
    pub fn label(&self) -> String {
        match self {
            Self::Subscription { tier, interval } => format!("{}/{}", tier.id, interval),
            Self::CreditPack(pack) => pack.id.clone(),
        }
    }
}

/// Price id → (tier, interval)
pub type PriceIndex = HashMap<String, (TierId, BillingInterval)>;

/// Build the reverse price index in table order.
///
/// A price id configured on more than one tier resolves to the last one.
pub fn build_price_index(tiers: &[PricingTier]) -> PriceIndex {
    let mut index = PriceIndex::new();

    for tier in tiers {
        for interval in [BillingInterval::Monthly, BillingInterval::Yearly] {
            let Some(price_id) = tier.price(interval).price_id.as_deref() else {
                continue;
            };
            if price_id.is_empty() {
                continue;
            }

            if let Some((previous, _)) = index.insert(price_id.to_string(), (tier.id, interval)) {
                if previous != tier.id {
                    tracing::warn!(
                        price_id,
                        previous = %previous,
                        tier = %tier.id,
                        "Price id shared between tiers; later tier wins"
                    );
                }
            }
        }
    }

    index
}

/// The full pricing table
#[derive(Clone, Debug)]
pub struct PricingCatalog {
    tiers: Vec<PricingTier>,
    credit_packs: Vec<CreditPack>,
    price_index: PriceIndex,
    free: usize,
}

impl PricingCatalog {
    /// Build a catalog, checking the tier invariants
    pub fn new(tiers: Vec<PricingTier>, credit_packs: Vec<CreditPack>) -> Result<Self> {
        for (i, tier) in tiers.iter().enumerate() {
            if tiers[..i].iter().any(|t| t.id == tier.id) {
                return Err(CoreError::Catalog(format!("duplicate tier id '{}'", tier.id)));
            }
        }

        let mut free_tiers = tiers.iter().enumerate().filter(|(_, t)| t.is_free());
        let free = match (free_tiers.next(), free_tiers.next()) {
            (Some((i, tier)), None) if tier.id == TierId::Free => i,
            (Some((_, tier)), None) => {
                return Err(CoreError::Catalog(format!(
                    "tier '{}' has no price but is not the free tier",
                    tier.id
                )));
            }
            (None, _) => return Err(CoreError::Catalog("no free tier".into())),
            (Some(_), Some(_)) => {
                return Err(CoreError::Catalog("more than one tier without a price".into()));
            }
        };

        if let Some(tier) = tiers
            .iter()
            .find(|t| !t.is_free() && t.pricing.monthly.amount.is_none())
        {
            return Err(CoreError::Catalog(format!(
                "paid tier '{}' has no monthly amount",
                tier.id
            )));
        }

        let price_index = build_price_index(&tiers);

        Ok(Self {
            tiers,
            credit_packs,
            price_index,
            free,
        })
    }

    /// The product's standard table with the given price ids
    pub fn standard(ids: &PriceIds) -> Result<Self> {
        Self::new(standard_tiers(ids), standard_credit_packs(ids))
    }

    /// Standard table with price ids from the environment
    pub fn from_env() -> Result<Self> {
        Self::standard(&PriceIds::from_env())
    }

    /// All tiers in table order (free included)
    pub fn tiers(&self) -> &[PricingTier] {
        &self.tiers
    }

    pub fn credit_packs(&self) -> &[CreditPack] {
        &self.credit_packs
    }

    pub const fn price_index(&self) -> &PriceIndex {
        &self.price_index
    }

    pub fn free_tier(&self) -> &PricingTier {
        &self.tiers[self.free]
    }

    /// Look up a tier by its string id
    pub fn tier_by_id(&self, id: &str) -> Option<&PricingTier> {
        TierId::parse(id).and_then(|id| self.tier(id))
    }

    pub fn tier(&self, id: TierId) -> Option<&PricingTier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// Resolve a Stripe price id to its tier and interval.
    ///
    /// An absent (or empty) price id means "no paid subscription" and yields
    /// the free tier without an interval. An unknown price id yields neither.
    pub fn tier_by_price_id(&self, price_id: Option<&str>) -> PriceLookup<'_> {
        let Some(price_id) = price_id.filter(|id| !id.is_empty()) else {
            return PriceLookup {
                tier: Some(self.free_tier()),
                interval: None,
            };
        };

        match self.price_index.get(price_id) {
            Some((tier_id, interval)) => PriceLookup {
                tier: self.tier(*tier_id),
                interval: Some(*interval),
            },
            None => PriceLookup::NOT_FOUND,
        }
    }

    /// Tiers shown on the pricing page: everything but the free tier
    pub fn visible_tiers(&self) -> Vec<&PricingTier> {
        self.tiers.iter().filter(|t| t.id != TierId::Free).collect()
    }

    pub fn credit_pack_by_id(&self, id: &str) -> Option<&CreditPack> {
        self.credit_packs.iter().find(|p| p.id == id)
    }

    pub fn credit_pack_by_price_id(&self, price_id: &str) -> Option<&CreditPack> {
        if price_id.is_empty() {
            return None;
        }
        self.credit_packs
            .iter()
            .find(|p| p.price_id.as_deref() == Some(price_id))
    }

    /// Resolve what a checkout for `price_id` in `mode` would buy
    pub fn purchase_for(&self, price_id: &str, mode: PurchaseMode) -> Result<Purchase<'_>> {
        let subscription = match self.tier_by_price_id(Some(price_id)) {
            PriceLookup {
                tier: Some(tier),
                interval: Some(interval),
            } => Some(Purchase::Subscription { tier, interval }),
            _ => None,
        };
        let pack = self.credit_pack_by_price_id(price_id).map(Purchase::CreditPack);

        match (mode, subscription, pack) {
            (PurchaseMode::Subscription, Some(purchase), _)
            | (PurchaseMode::Payment, _, Some(purchase)) => Ok(purchase),
            (_, None, None) => Err(CoreError::UnknownPrice(price_id.to_string())),
            _ => Err(CoreError::ModeMismatch {
                price_id: price_id.to_string(),
                mode: mode.as_str().to_string(),
            }),
        }
    }

    /// Paid tier price slots with no price id configured ("basic/monthly", ...)
    pub fn missing_price_ids(&self) -> Vec<String> {
        self.tiers
            .iter()
            .filter(|t| !t.is_free())
            .flat_map(|t| {
                [BillingInterval::Monthly, BillingInterval::Yearly]
                    .into_iter()
                    .filter(|i| t.price(*i).price_id.is_none())
                    .map(move |i| format!("{}/{}", t.id, i))
            })
            .collect()
    }
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn standard_tiers(ids: &PriceIds) -> Vec<PricingTier> {
    vec![
        PricingTier {
            id: TierId::Basic,
            name: "Basic".into(),
            description: "Pay as you go for occasional use".into(),
            credits: 500,
            features: features(&[
                "500 starter credits",
                "Access to 1 basic AI model",
                "Pay-as-you-go credit packs",
                "1 concurrent generation job",
                "Standard resolution sprites",
                "Community support",
            ]),
            popular: false,
            pricing: TierPricing {
                monthly: PriceOption::paid(ids.basic_monthly.clone(), 900),
                yearly: PriceOption::paid(ids.basic_yearly.clone(), 9900).with_discount(8),
            },
        },
        PricingTier {
            id: TierId::Indie,
            name: "Indie".into(),
            description: "Perfect for individual creators and small projects".into(),
            credits: 2000,
            features: features(&[
                "2,000 credits per month",
                "Access to 3 AI sprite models",
                "Private projects",
                "2 concurrent generation jobs",
                "Download in PNG format",
                "Standard resolution sprites",
                "Email support",
            ]),
            popular: true,
            pricing: TierPricing {
                monthly: PriceOption::paid(ids.indie_monthly.clone(), 1900),
                yearly: PriceOption::paid(ids.indie_yearly.clone(), 19900).with_discount(12),
            },
        },
        PricingTier {
            id: TierId::Studio,
            name: "Studio".into(),
            description: "For professional game developers and studios".into(),
            credits: 6000,
            features: features(&[
                "6,000 credits per month",
                "Unlimited access to all 5 AI models",
                "Priority generation queue",
                "5 concurrent generation jobs",
                "Download in multiple formats (PNG, SVG, Sheets)",
                "High-resolution sprites",
                "Priority support",
            ]),
            popular: false,
            pricing: TierPricing {
                monthly: PriceOption::paid(ids.studio_monthly.clone(), 4900),
                yearly: PriceOption::paid(ids.studio_yearly.clone(), 49900).with_discount(15),
            },
        },
        // Hidden from the pricing page; users without a subscription resolve to it
        PricingTier {
            id: TierId::Free,
            name: "Free".into(),
            description: "Essential features for individuals".into(),
            credits: 0,
            features: features(&[
                "Basic dashboard access",
                "Limited access to features",
                "Community support",
                "0 credits per month",
            ]),
            popular: false,
            pricing: TierPricing::default(),
        },
    ]
}

fn standard_credit_packs(ids: &PriceIds) -> Vec<CreditPack> {
    let pack = |credits: u32, description: &str, price_id: &Option<String>| CreditPack {
        id: format!("credits-{credits}"),
        name: format!("{credits} Credits"),
        description: description.into(),
        credits,
        price: i64::from(credits),
        price_id: price_id.clone(),
    };

    vec![
        pack(1000, "Top up with a small credit pack", &ids.credit_pack_1000),
        pack(2500, "Best value for regular users", &ids.credit_pack_2500),
        pack(5000, "Best value for power users", &ids.credit_pack_5000),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured_ids() -> PriceIds {
        PriceIds {
            basic_monthly: Some("price_basic_m".into()),
            basic_yearly: Some("price_basic_y".into()),
            indie_monthly: Some("P1".into()),
            indie_yearly: Some("P2".into()),
            studio_monthly: Some("price_studio_m".into()),
            studio_yearly: Some("price_studio_y".into()),
            credit_pack_1000: Some("price_pack_1000".into()),
            credit_pack_2500: Some("price_pack_2500".into()),
            credit_pack_5000: None,
        }
    }

    fn catalog() -> PricingCatalog {
        PricingCatalog::standard(&configured_ids()).unwrap()
    }

    #[test]
    fn test_every_configured_price_resolves_to_its_tier() {
        let catalog = catalog();

        for tier in catalog.tiers() {
            for interval in [BillingInterval::Monthly, BillingInterval::Yearly] {
                if let Some(price_id) = tier.price(interval).price_id.as_deref() {
                    let lookup = catalog.tier_by_price_id(Some(price_id));
                    assert_eq!(lookup.tier.map(|t| t.id), Some(tier.id));
                    assert_eq!(lookup.interval, Some(interval));
                }
            }
        }
    }

    #[test]
    fn test_yearly_price_resolves_to_yearly_interval() {
        let catalog = catalog();
        let lookup = catalog.tier_by_price_id(Some("P2"));
        assert_eq!(lookup.tier.unwrap().id, TierId::Indie);
        assert_eq!(lookup.interval, Some(BillingInterval::Yearly));
    }

    #[test]
    fn test_absent_price_id_is_free_tier() {
        let catalog = catalog();

        let lookup = catalog.tier_by_price_id(None);
        assert_eq!(lookup.tier.unwrap().id, TierId::Free);
        assert_eq!(lookup.interval, None);

        let lookup = catalog.tier_by_price_id(Some(""));
        assert_eq!(lookup.tier.unwrap().id, TierId::Free);
        assert_eq!(lookup.interval, None);
    }

    #[test]
    fn test_unknown_price_id() {
        let catalog = catalog();
        let lookup = catalog.tier_by_price_id(Some("unknown-id"));
        assert!(lookup.tier.is_none());
        assert!(lookup.interval.is_none());
    }

    #[test]
    fn test_visible_tiers_exclude_free() {
        let catalog = catalog();
        let visible = catalog.visible_tiers();

        assert_eq!(visible.len(), catalog.tiers().len() - 1);
        assert!(visible.iter().all(|t| t.id != TierId::Free));
        let order: Vec<_> = visible.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![TierId::Basic, TierId::Indie, TierId::Studio]);
    }

    #[test]
    fn test_tier_by_id() {
        let catalog = catalog();
        assert_eq!(catalog.tier_by_id("studio").unwrap().credits, 6000);
        assert!(catalog.tier_by_id("enterprise").is_none());
        assert!(catalog.tier_by_id("").is_none());
        assert!(catalog.tier_by_id("Indie").is_none());
    }

    #[test]
    fn test_unconfigured_prices_are_not_indexed() {
        let catalog = PricingCatalog::standard(&PriceIds::default()).unwrap();
        assert!(catalog.price_index().is_empty());
        assert_eq!(catalog.missing_price_ids().len(), 6);
        assert!(catalog.missing_price_ids().contains(&"indie/yearly".to_string()));
    }

    #[test]
    fn test_shared_price_id_resolves_to_later_tier() {
        let ids = PriceIds {
            basic_monthly: Some("price_shared".into()),
            indie_monthly: Some("price_shared".into()),
            ..PriceIds::default()
        };
        let catalog = PricingCatalog::standard(&ids).unwrap();

        let lookup = catalog.tier_by_price_id(Some("price_shared"));
        assert_eq!(lookup.tier.unwrap().id, TierId::Indie);
        assert_eq!(lookup.interval, Some(BillingInterval::Monthly));
    }

    #[test]
    fn test_catalog_requires_exactly_one_free_tier() {
        let ids = PriceIds::default();
        let mut tiers = standard_tiers(&ids);
        tiers.retain(|t| t.id != TierId::Free);
        assert!(matches!(
            PricingCatalog::new(tiers, Vec::new()),
            Err(CoreError::Catalog(_))
        ));

        let mut tiers = standard_tiers(&ids);
        tiers[0].pricing = TierPricing::default();
        assert!(PricingCatalog::new(tiers, Vec::new()).is_err());
    }

    #[test]
    fn test_catalog_requires_monthly_amount_on_paid_tiers() {
        let mut tiers = standard_tiers(&PriceIds::default());
        tiers[1].pricing.monthly.amount = None;
        assert!(PricingCatalog::new(tiers, Vec::new()).is_err());
    }

    #[test]
    fn test_catalog_rejects_duplicate_tier_ids() {
        let mut tiers = standard_tiers(&PriceIds::default());
        tiers[2].id = TierId::Basic;
        assert!(PricingCatalog::new(tiers, Vec::new()).is_err());
    }

    #[test]
    fn test_purchase_for() {
        let catalog = catalog();

        match catalog.purchase_for("price_studio_y", PurchaseMode::Subscription).unwrap() {
            Purchase::Subscription { tier, interval } => {
                assert_eq!(tier.id, TierId::Studio);
                assert_eq!(interval, BillingInterval::Yearly);
            }
            Purchase::CreditPack(_) => panic!("expected a subscription"),
        }

        let purchase = catalog.purchase_for("price_pack_2500", PurchaseMode::Payment).unwrap();
        assert_eq!(purchase.mode(), PurchaseMode::Payment);
        assert_eq!(purchase.label(), "credits-2500");

        assert!(matches!(
            catalog.purchase_for("price_pack_2500", PurchaseMode::Subscription),
            Err(CoreError::ModeMismatch { .. })
        ));
        assert!(matches!(
            catalog.purchase_for("nope", PurchaseMode::Payment),
            Err(CoreError::UnknownPrice(_))
        ));
    }

    #[test]
    fn test_price_ids_from_lookup() {
        let ids = PriceIds::from_lookup(|key| match key {
            "STRIPE_PRICE_INDIE_MONTHLY" => Some("price_indie".into()),
            "STRIPE_PRICE_STUDIO_YEARLY" => Some("   ".into()),
            _ => None,
        });
        assert_eq!(ids.indie_monthly.as_deref(), Some("price_indie"));
        assert!(ids.studio_yearly.is_none());
        assert!(ids.basic_monthly.is_none());
    }

    #[test]
    fn test_credit_packs() {
        let catalog = catalog();
        assert_eq!(catalog.credit_packs().len(), 3);

        let pack = catalog.credit_pack_by_id("credits-5000").unwrap();
        assert_eq!(pack.price, 5000);
        assert!(pack.price_id.is_none());
        assert_eq!(
            catalog.credit_pack_by_price_id("price_pack_1000").unwrap().credits,
            1000
        );
        assert!(catalog.credit_pack_by_price_id("").is_none());
    }
}
