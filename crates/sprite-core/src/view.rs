//! Pricing Page View
//!
//! Decides what the pricing page shows for a visitor: which plan is theirs,
//! which billing interval the toggle starts on, and the call to action of
//! every tier card and credit pack.

use serde::{Deserialize, Serialize};

use crate::pricing::{BillingInterval, CreditPack, PricingCatalog, PricingTier, TierId};

/// The visitor's plan as far as the pricing page is concerned
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlan {
    pub tier_id: TierId,
    pub interval: BillingInterval,
}

impl Default for CurrentPlan {
    fn default() -> Self {
        Self {
            tier_id: TierId::Free,
            interval: BillingInterval::Monthly,
        }
    }
}

impl CurrentPlan {
    /// Plan for a visitor whose current subscription has `price_id`.
    ///
    /// Pass `None` for visitors without a subscription. An unknown price id
    /// leaves the visitor on the free tier.
    pub fn resolve(catalog: &PricingCatalog, price_id: Option<&str>) -> Self {
        let lookup = catalog.tier_by_price_id(price_id);
        let mut plan = Self::default();

        if let Some(tier) = lookup.tier {
            plan.tier_id = tier.id;
            if let Some(interval) = lookup.interval {
                plan.interval = interval;
            }
        }

        plan
    }
}

/// Call to action on a tier card
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TierAction {
    /// The visitor already has this tier at this interval
    CurrentPlan,
    /// Switch the visitor's tier to another interval
    ChangePlan { price_id: String },
    Subscribe { price_id: String },
    /// Tier without a checkout price: plain navigation
    Link { href: String, label: String },
}

impl TierAction {
    pub fn for_tier(
        tier: &PricingTier,
        selected: BillingInterval,
        current: CurrentPlan,
        authenticated: bool,
    ) -> Self {
        let is_current = current.tier_id == tier.id;

        match tier.price(selected).price_id.as_deref() {
            Some(_) if is_current && selected == current.interval => Self::CurrentPlan,
            Some(price_id) if is_current => Self::ChangePlan {
                price_id: price_id.to_string(),
            },
            Some(price_id) => Self::Subscribe {
                price_id: price_id.to_string(),
            },
            None => Self::Link {
                href: if is_current || authenticated {
                    "/dashboard".into()
                } else {
                    "/signup".into()
                },
                label: if is_current { "DASHBOARD" } else { "GET STARTED" }.into(),
            },
        }
    }

    /// Button text
    pub fn label(&self) -> &str {
        match self {
            Self::CurrentPlan => "CURRENT PLAN",
            Self::ChangePlan { .. } => "CHANGE PLAN",
            Self::Subscribe { .. } => "SUBSCRIBE",
            Self::Link { label, .. } => label.as_str(),
        }
    }

    /// Price id a click would check out, if any
    pub fn price_id(&self) -> Option<&str> {
        match self {
            Self::ChangePlan { price_id } | Self::Subscribe { price_id } => Some(price_id.as_str()),
            _ => None,
        }
    }
}

/// Call to action on a credit pack
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CreditPackAction {
    SignIn,
    Purchase { price_id: String },
    /// Pack has no price configured
    Unavailable,
}

impl CreditPackAction {
    pub fn for_pack(pack: &CreditPack, authenticated: bool) -> Self {
        match pack.price_id.as_deref().filter(|id| !id.is_empty()) {
            None => Self::Unavailable,
            Some(_) if !authenticated => Self::SignIn,
            Some(price_id) => Self::Purchase {
                price_id: price_id.to_string(),
            },
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::SignIn => "SIGN IN",
            Self::Purchase { .. } => "PURCHASE",
            Self::Unavailable => "UNAVAILABLE",
        }
    }
}

/// Everything the pricing page needs, as served by `GET /api/pricing`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPageView {
    pub tiers: Vec<PricingTier>,
    pub credit_packs: Vec<CreditPack>,
    pub current_tier_id: TierId,
    pub initial_interval: BillingInterval,
    pub authenticated: bool,
}

impl PricingPageView {
    /// View for a visitor; `subscription_price_id` is `Some` only for signed-in
    /// visitors with a current subscription
    pub fn build(
        catalog: &PricingCatalog,
        authenticated: bool,
        subscription_price_id: Option<Option<&str>>,
    ) -> Self {
        let current = subscription_price_id
            .map(|price_id| CurrentPlan::resolve(catalog, price_id))
            .unwrap_or_default();

        Self {
            tiers: catalog.visible_tiers().into_iter().cloned().collect(),
            credit_packs: catalog.credit_packs().to_vec(),
            current_tier_id: current.tier_id,
            initial_interval: current.interval,
            authenticated,
        }
    }

    pub const fn current_plan(&self) -> CurrentPlan {
        CurrentPlan {
            tier_id: self.current_tier_id,
            interval: self.initial_interval,
        }
    }

    pub fn tier_action(&self, tier: &PricingTier, selected: BillingInterval) -> TierAction {
        TierAction::for_tier(tier, selected, self.current_plan(), self.authenticated)
    }

    pub fn credit_pack_action(&self, pack: &CreditPack) -> CreditPackAction {
        CreditPackAction::for_pack(pack, self.authenticated)
    }
}

/// Where the visitor's session stands while the front-end resolves it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Account lookup still in flight
    Checking,
    SignedIn,
    SignedOut,
}

impl SessionState {
    pub const fn new(checked: bool, signed_in: bool) -> Self {
        match (signed_in, checked) {
            (true, _) => Self::SignedIn,
            (false, false) => Self::Checking,
            (false, true) => Self::SignedOut,
        }
    }

    /// Pages behind sign-in send the visitor to `/login`
    pub const fn needs_login(self) -> bool {
        matches!(self, Self::SignedOut)
    }
}

/// Tier price as shown on its card; unpriced tiers read "Free"
pub fn tier_price_label(amount: Option<i64>) -> String {
    amount.map_or_else(|| "Free".into(), format_price)
}

/// Format an amount in cents as US dollars: `$9`, `$9.50`
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let (dollars, rest) = (cents / 100, cents % 100);

    let mut whole = String::new();
    let digits = dollars.to_string();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            whole.push(',');
        }
        whole.push(c);
    }

    if rest == 0 {
        format!("{sign}${whole}")
    } else {
        format!("{sign}${whole}.{rest:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceIds;

    fn catalog() -> PricingCatalog {
        PricingCatalog::standard(&PriceIds {
            basic_monthly: Some("price_basic_m".into()),
            basic_yearly: Some("price_basic_y".into()),
            indie_monthly: Some("price_indie_m".into()),
            indie_yearly: Some("price_indie_y".into()),
            studio_monthly: Some("price_studio_m".into()),
            studio_yearly: None,
            credit_pack_1000: Some("price_pack_1000".into()),
            credit_pack_2500: None,
            credit_pack_5000: None,
        })
        .unwrap()
    }

    #[test]
    fn test_current_plan_resolution() {
        let catalog = catalog();

        assert_eq!(CurrentPlan::resolve(&catalog, None), CurrentPlan::default());

        let plan = CurrentPlan::resolve(&catalog, Some("price_indie_y"));
        assert_eq!(plan.tier_id, TierId::Indie);
        assert_eq!(plan.interval, BillingInterval::Yearly);

        let plan = CurrentPlan::resolve(&catalog, Some("price_retired"));
        assert_eq!(plan, CurrentPlan::default());
    }

    #[test]
    fn test_tier_actions_for_subscriber() {
        let catalog = catalog();
        let current = CurrentPlan::resolve(&catalog, Some("price_indie_m"));
        let indie = catalog.tier(TierId::Indie).unwrap();
        let basic = catalog.tier(TierId::Basic).unwrap();

        assert_eq!(
            TierAction::for_tier(indie, BillingInterval::Monthly, current, true),
            TierAction::CurrentPlan
        );
        assert_eq!(
            TierAction::for_tier(indie, BillingInterval::Yearly, current, true),
            TierAction::ChangePlan {
                price_id: "price_indie_y".into()
            }
        );
        let action = TierAction::for_tier(basic, BillingInterval::Monthly, current, true);
        assert_eq!(action.label(), "SUBSCRIBE");
        assert_eq!(action.price_id(), Some("price_basic_m"));
    }

    #[test]
    fn test_unpriced_tier_links() {
        let catalog = catalog();
        let studio = catalog.tier(TierId::Studio).unwrap();
        let visitor = CurrentPlan::default();

        assert_eq!(
            TierAction::for_tier(studio, BillingInterval::Yearly, visitor, false),
            TierAction::Link {
                href: "/signup".into(),
                label: "GET STARTED".into()
            }
        );
        assert_eq!(
            TierAction::for_tier(studio, BillingInterval::Yearly, visitor, true),
            TierAction::Link {
                href: "/dashboard".into(),
                label: "GET STARTED".into()
            }
        );

        let free = catalog.free_tier();
        let action = TierAction::for_tier(free, BillingInterval::Monthly, visitor, false);
        assert_eq!(
            action,
            TierAction::Link {
                href: "/dashboard".into(),
                label: "DASHBOARD".into()
            }
        );
    }

    #[test]
    fn test_credit_pack_actions() {
        let catalog = catalog();
        let packs = catalog.credit_packs();

        assert_eq!(CreditPackAction::for_pack(&packs[0], false), CreditPackAction::SignIn);
        assert_eq!(
            CreditPackAction::for_pack(&packs[0], true),
            CreditPackAction::Purchase {
                price_id: "price_pack_1000".into()
            }
        );
        assert_eq!(CreditPackAction::for_pack(&packs[1], true), CreditPackAction::Unavailable);
    }

    #[test]
    fn test_page_view() {
        let catalog = catalog();

        let anonymous = PricingPageView::build(&catalog, false, None);
        assert_eq!(anonymous.tiers.len(), 3);
        assert_eq!(anonymous.current_tier_id, TierId::Free);
        assert_eq!(anonymous.initial_interval, BillingInterval::Monthly);

        let subscriber = PricingPageView::build(&catalog, true, Some(Some("price_basic_y")));
        assert_eq!(subscriber.current_tier_id, TierId::Basic);
        assert_eq!(subscriber.initial_interval, BillingInterval::Yearly);

        let json = serde_json::to_value(&subscriber).unwrap();
        assert_eq!(json["currentTierId"], "basic");
        assert_eq!(json["initialInterval"], "yearly");
        assert_eq!(json["tiers"][1]["pricing"]["yearly"]["discount"], 12);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(900), "$9");
        assert_eq!(format_price(19900), "$199");
        assert_eq!(format_price(950), "$9.50");
        assert_eq!(format_price(5), "$0.05");
        assert_eq!(format_price(123_456_700), "$1,234,567");
        assert_eq!(format_price(-1000), "-$10");

        assert_eq!(tier_price_label(None), "Free");
        assert_eq!(tier_price_label(Some(0)), "$0");
        assert_eq!(tier_price_label(Some(1900)), "$19");
    }

    #[test]
    fn test_session_state() {
        // A refresh after login is still in flight: stay put
        assert_eq!(SessionState::new(false, false), SessionState::Checking);
        assert!(!SessionState::new(false, false).needs_login());

        assert!(!SessionState::new(true, true).needs_login());
        assert!(!SessionState::new(false, true).needs_login());
        assert!(SessionState::new(true, false).needs_login());
    }
}
