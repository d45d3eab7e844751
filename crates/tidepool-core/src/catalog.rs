//! The immutable game catalog and its builder.
//!
//! All game content — resources, flags, prices, producers, tabs, actions,
//! milestones — is registered once at startup and frozen. The engine threads
//! the catalog through every evaluation explicitly; there are no module-level
//! statics. Three-phase lifecycle: register, validate, freeze.

use crate::condition::Condition;
use crate::cost::{Growth, Iterations, Price};
use crate::effect::Effect;
use crate::id::{ActionId, FlagId, MilestoneId, PriceId, ProducerId, ResourceId, TabId};
use crate::milestone::MilestoneDef;
use crate::production::{ProducerDef, ProducerOp};
use crate::resource::ResourceDef;
use crate::state::GlobalValue;
use crate::tab::{ActionDef, PaneElement, TabDef};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Flag definitions
// ---------------------------------------------------------------------------

/// A registered global flag and its default value.
#[derive(Debug, Clone)]
pub struct FlagDef {
    pub key: String,
    pub default: GlobalValue,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors detected while freezing a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate {kind} key: {key}")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("unknown resource reference: {0:?}")]
    UnknownResource(ResourceId),

    #[error("unknown flag reference: {0:?}")]
    UnknownFlag(FlagId),

    #[error("unknown price reference: {0:?}")]
    UnknownPrice(PriceId),

    #[error("unknown producer reference: {0:?}")]
    UnknownProducer(ProducerId),

    #[error("unknown tab reference: {0:?}")]
    UnknownTab(TabId),

    #[error("unknown action reference: {0:?}")]
    UnknownAction(ActionId),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Registration phase. Register content in dependency order (resources and
/// flags first, then prices, then the surfaces that reference them), call
/// [`CatalogBuilder::build`], and hand the frozen catalog to the engine.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    resources: Vec<ResourceDef>,
    flags: Vec<FlagDef>,
    prices: Vec<(String, Price)>,
    producers: Vec<ProducerDef>,
    tabs: Vec<TabDef>,
    actions: Vec<ActionDef>,
    milestones: Vec<MilestoneDef>,
    default_tab: Option<TabId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. Returns its ID.
    pub fn register_resource(
        &mut self,
        key: &str,
        name: &str,
        singular: &str,
        visible: Condition,
    ) -> ResourceId {
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(ResourceDef {
            key: key.to_string(),
            name: name.to_string(),
            singular: singular.to_string(),
            visible,
        });
        id
    }

    /// Replace a resource's visibility condition after registration. For
    /// predicates that reference entities registered later (including the
    /// resource itself); still validated at build.
    pub fn set_resource_visibility(&mut self, id: ResourceId, visible: Condition) {
        self.resources[id.0 as usize].visible = visible;
    }

    /// Register a global flag with its default value. Returns its ID.
    pub fn register_flag(&mut self, key: &str, default: GlobalValue) -> FlagId {
        let id = FlagId(self.flags.len() as u32);
        self.flags.push(FlagDef {
            key: key.to_string(),
            default,
        });
        id
    }

    /// Register a price for buttons and conditions to reference. Returns its ID.
    pub fn register_price(&mut self, key: &str, price: Price) -> PriceId {
        let id = PriceId(self.prices.len() as u32);
        self.prices.push((key.to_string(), price));
        id
    }

    /// Register a production unit. Units tick in registration order.
    pub fn register_producer(&mut self, key: &str, name: &str, op: ProducerOp) -> ProducerId {
        let id = ProducerId(self.producers.len() as u32);
        self.producers.push(ProducerDef {
            key: key.to_string(),
            name: name.to_string(),
            op,
        });
        id
    }

    /// Register a tab. Tab registration order is also the auto-reroute order.
    pub fn register_tab(&mut self, tab: TabDef) -> TabId {
        let id = TabId(self.tabs.len() as u32);
        self.tabs.push(tab);
        id
    }

    /// Register an action (button).
    pub fn register_action(&mut self, action: ActionDef) -> ActionId {
        let id = ActionId(self.actions.len() as u32);
        self.actions.push(action);
        id
    }

    /// Register a milestone. Milestones evaluate in registration order.
    pub fn register_milestone(&mut self, milestone: MilestoneDef) -> MilestoneId {
        let id = MilestoneId(self.milestones.len() as u32);
        self.milestones.push(milestone);
        id
    }

    /// The tab a fresh game starts on.
    pub fn set_default_tab(&mut self, tab: TabId) {
        self.default_tab = Some(tab);
    }

    /// Validate every cross-reference and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let catalog = Catalog {
            resource_ids: key_map("resource", self.resources.iter().map(|r| &r.key), ResourceId)?,
            flag_ids: key_map("flag", self.flags.iter().map(|f| &f.key), FlagId)?,
            price_ids: key_map("price", self.prices.iter().map(|(k, _)| k), PriceId)?,
            producer_ids: key_map("producer", self.producers.iter().map(|p| &p.key), ProducerId)?,
            tab_ids: key_map("tab", self.tabs.iter().map(|t| &t.key), TabId)?,
            action_ids: key_map("action", self.actions.iter().map(|a| &a.key), ActionId)?,
            milestone_ids: key_map(
                "milestone",
                self.milestones.iter().map(|m| &m.key),
                MilestoneId,
            )?,
            resources: self.resources,
            flags: self.flags,
            prices: self.prices,
            producers: self.producers,
            tabs: self.tabs,
            actions: self.actions,
            milestones: self.milestones,
            default_tab: self.default_tab,
        };
        catalog.validate()?;
        Ok(catalog)
    }
}

fn key_map<'a, I, Id>(
    kind: &'static str,
    keys: I,
    make: impl Fn(u32) -> Id,
) -> Result<HashMap<String, Id>, CatalogError>
where
    I: Iterator<Item = &'a String>,
{
    let mut map = HashMap::new();
    for (index, key) in keys.enumerate() {
        if map.insert(key.clone(), make(index as u32)).is_some() {
            return Err(CatalogError::DuplicateKey {
                kind,
                key: key.clone(),
            });
        }
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after build.
#[derive(Debug)]
pub struct Catalog {
    resources: Vec<ResourceDef>,
    flags: Vec<FlagDef>,
    prices: Vec<(String, Price)>,
    producers: Vec<ProducerDef>,
    tabs: Vec<TabDef>,
    actions: Vec<ActionDef>,
    milestones: Vec<MilestoneDef>,
    default_tab: Option<TabId>,

    resource_ids: HashMap<String, ResourceId>,
    flag_ids: HashMap<String, FlagId>,
    price_ids: HashMap<String, PriceId>,
    producer_ids: HashMap<String, ProducerId>,
    tab_ids: HashMap<String, TabId>,
    action_ids: HashMap<String, ActionId>,
    milestone_ids: HashMap<String, MilestoneId>,
}

impl Catalog {
    // -- Lookup by key --

    pub fn resource_id(&self, key: &str) -> Option<ResourceId> {
        self.resource_ids.get(key).copied()
    }

    pub fn flag_id(&self, key: &str) -> Option<FlagId> {
        self.flag_ids.get(key).copied()
    }

    pub fn price_id(&self, key: &str) -> Option<PriceId> {
        self.price_ids.get(key).copied()
    }

    pub fn producer_id(&self, key: &str) -> Option<ProducerId> {
        self.producer_ids.get(key).copied()
    }

    pub fn tab_id(&self, key: &str) -> Option<TabId> {
        self.tab_ids.get(key).copied()
    }

    pub fn action_id(&self, key: &str) -> Option<ActionId> {
        self.action_ids.get(key).copied()
    }

    pub fn milestone_id(&self, key: &str) -> Option<MilestoneId> {
        self.milestone_ids.get(key).copied()
    }

    // -- Access by id --

    pub fn resource(&self, id: ResourceId) -> &ResourceDef {
        &self.resources[id.0 as usize]
    }

    pub fn flag(&self, id: FlagId) -> &FlagDef {
        &self.flags[id.0 as usize]
    }

    pub fn price(&self, id: PriceId) -> &Price {
        &self.prices[id.0 as usize].1
    }

    pub fn producer(&self, id: ProducerId) -> &ProducerDef {
        &self.producers[id.0 as usize]
    }

    pub fn tab(&self, id: TabId) -> &TabDef {
        &self.tabs[id.0 as usize]
    }

    pub fn action(&self, id: ActionId) -> &ActionDef {
        &self.actions[id.0 as usize]
    }

    pub fn milestone(&self, id: MilestoneId) -> &MilestoneDef {
        &self.milestones[id.0 as usize]
    }

    // -- Counts and iteration (registration order) --

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn flag_count(&self) -> usize {
        self.flags.len()
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn milestone_count(&self) -> usize {
        self.milestones.len()
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &ResourceDef)> {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, def)| (ResourceId(i as u32), def))
    }

    pub fn producers(&self) -> impl Iterator<Item = (ProducerId, &ProducerDef)> {
        self.producers
            .iter()
            .enumerate()
            .map(|(i, def)| (ProducerId(i as u32), def))
    }

    pub fn tabs(&self) -> impl Iterator<Item = (TabId, &TabDef)> {
        self.tabs
            .iter()
            .enumerate()
            .map(|(i, def)| (TabId(i as u32), def))
    }

    pub fn milestones(&self) -> impl Iterator<Item = (MilestoneId, &MilestoneDef)> {
        self.milestones
            .iter()
            .enumerate()
            .map(|(i, def)| (MilestoneId(i as u32), def))
    }

    // -- Defaults --

    pub fn default_tab(&self) -> Option<TabId> {
        self.default_tab
    }

    /// Default global values, indexed by [`FlagId`].
    pub fn default_globals(&self) -> Vec<GlobalValue> {
        self.flags.iter().map(|f| f.default).collect()
    }

    // -- Validation --

    fn validate(&self) -> Result<(), CatalogError> {
        for def in &self.resources {
            self.check_condition(&def.visible)?;
        }
        for (_, price) in &self.prices {
            self.check_price(price)?;
        }
        for def in &self.producers {
            match &def.op {
                ProducerOp::Emit { resource, .. } => self.check_resource(*resource)?,
                ProducerOp::Convert { from, to, .. } => {
                    self.check_resource(*from)?;
                    self.check_resource(*to)?;
                }
            }
        }
        for def in &self.tabs {
            self.check_condition(&def.visible)?;
            for element in &def.elements {
                self.check_condition(element.visible())?;
                if let PaneElement::Buttons { actions, .. } = element {
                    for action in actions {
                        if action.0 as usize >= self.actions.len() {
                            return Err(CatalogError::UnknownAction(*action));
                        }
                    }
                }
            }
        }
        for def in &self.actions {
            self.check_condition(&def.visible)?;
            self.check_condition(&def.enabled)?;
            if let Some(price) = def.price {
                self.check_price_id(price)?;
            }
            self.check_effects(&def.effects)?;
        }
        for def in &self.milestones {
            self.check_condition(&def.test)?;
            self.check_effects(&def.effects)?;
        }
        if let Some(tab) = self.default_tab {
            if tab.0 as usize >= self.tabs.len() {
                return Err(CatalogError::UnknownTab(tab));
            }
        }
        Ok(())
    }

    fn check_resource(&self, id: ResourceId) -> Result<(), CatalogError> {
        if id.0 as usize >= self.resources.len() {
            return Err(CatalogError::UnknownResource(id));
        }
        Ok(())
    }

    fn check_flag(&self, id: FlagId) -> Result<(), CatalogError> {
        if id.0 as usize >= self.flags.len() {
            return Err(CatalogError::UnknownFlag(id));
        }
        Ok(())
    }

    fn check_price_id(&self, id: PriceId) -> Result<(), CatalogError> {
        if id.0 as usize >= self.prices.len() {
            return Err(CatalogError::UnknownPrice(id));
        }
        Ok(())
    }

    fn check_price(&self, price: &Price) -> Result<(), CatalogError> {
        for term in &price.terms {
            self.check_resource(term.resource)?;
            if let Growth::AddOwned { resource, .. } = term.growth {
                self.check_resource(resource)?;
            }
        }
        match price.iterations {
            Iterations::Constant(_) => Ok(()),
            Iterations::ResourceAmount(id) => self.check_resource(id),
            Iterations::ProducerAmount(id) => {
                if id.0 as usize >= self.producers.len() {
                    return Err(CatalogError::UnknownProducer(id));
                }
                Ok(())
            }
        }
    }

    fn check_condition(&self, condition: &Condition) -> Result<(), CatalogError> {
        match condition {
            Condition::Always => Ok(()),
            Condition::AmountAtLeast { resource, .. } => self.check_resource(*resource),
            Condition::FlagSet(flag) => self.check_flag(*flag),
            Condition::CanAfford(price) => self.check_price_id(*price),
            Condition::Not(inner) => self.check_condition(inner),
            Condition::All(inner) | Condition::Any(inner) => {
                inner.iter().try_for_each(|c| self.check_condition(c))
            }
        }
    }

    fn check_effects(&self, effects: &[Effect]) -> Result<(), CatalogError> {
        for effect in effects {
            match effect {
                Effect::Grant { resource, .. } | Effect::GrantRandom { resource, .. } => {
                    self.check_resource(*resource)?;
                }
                Effect::Spend(price) => self.check_price_id(*price)?,
                Effect::SetFlag { flag, .. } => self.check_flag(*flag)?,
                Effect::SetTabText { tab, .. } => {
                    if tab.0 as usize >= self.tabs.len() {
                        return Err(CatalogError::UnknownTab(*tab));
                    }
                }
                Effect::AddProducer { producer, .. } => {
                    if producer.0 as usize >= self.producers.len() {
                        return Err(CatalogError::UnknownProducer(*producer));
                    }
                }
                Effect::Log(_) | Effect::Deactivate => {}
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostTerm;

    fn builder_with_basics() -> CatalogBuilder {
        let mut b = CatalogBuilder::new();
        let sand = b.register_resource("sand", "Sand", "Sand", Condition::Always);
        b.register_flag("bucket", GlobalValue::Bool(false));
        b.register_price(
            "bucket",
            Price::flat(vec![CostTerm::new(sand, 20.0, Growth::Constant)]),
        );
        b
    }

    #[test]
    fn register_and_lookup() {
        let catalog = builder_with_basics().build().unwrap();
        assert_eq!(catalog.resource_count(), 1);
        let sand = catalog.resource_id("sand").unwrap();
        assert_eq!(catalog.resource(sand).singular, "Sand");
        assert!(catalog.resource_id("kelp").is_none());
        assert!(catalog.flag_id("bucket").is_some());
        assert!(catalog.price_id("bucket").is_some());
    }

    #[test]
    fn duplicate_key_fails() {
        let mut b = builder_with_basics();
        b.register_resource("sand", "More Sand", "More Sand", Condition::Always);
        match b.build() {
            Err(CatalogError::DuplicateKey { kind, key }) => {
                assert_eq!(kind, "resource");
                assert_eq!(key, "sand");
            }
            other => panic!("expected DuplicateKey, got: {other:?}"),
        }
    }

    #[test]
    fn dangling_resource_reference_fails() {
        let mut b = builder_with_basics();
        b.register_price(
            "bogus",
            Price::flat(vec![CostTerm::new(ResourceId(99), 1.0, Growth::Constant)]),
        );
        assert!(matches!(
            b.build(),
            Err(CatalogError::UnknownResource(ResourceId(99)))
        ));
    }

    #[test]
    fn dangling_condition_reference_fails() {
        let mut b = builder_with_basics();
        b.register_resource(
            "kelp",
            "Kelp",
            "Kelp",
            Condition::FlagSet(FlagId(7)),
        );
        assert!(matches!(b.build(), Err(CatalogError::UnknownFlag(FlagId(7)))));
    }

    #[test]
    fn dangling_milestone_effect_fails() {
        let mut b = builder_with_basics();
        b.register_milestone(MilestoneDef::new(
            "bad",
            Condition::Always,
            vec![Effect::AddProducer {
                producer: ProducerId(3),
                amount: 1.0,
            }],
        ));
        assert!(matches!(
            b.build(),
            Err(CatalogError::UnknownProducer(ProducerId(3)))
        ));
    }

    #[test]
    fn default_tab_must_exist() {
        let mut b = builder_with_basics();
        b.set_default_tab(TabId(4));
        assert!(matches!(b.build(), Err(CatalogError::UnknownTab(TabId(4)))));
    }

    #[test]
    fn empty_catalog_builds() {
        let catalog = CatalogBuilder::new().build().unwrap();
        assert_eq!(catalog.resource_count(), 0);
        assert_eq!(catalog.tab_count(), 0);
        assert!(catalog.default_tab().is_none());
    }
}
