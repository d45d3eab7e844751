//! The beach catalog: all game data, registered in dependency order.
//!
//! Progression arc: gather sand (with the odd lucky rock) -> sandcastles ->
//! the crabitalist arrives at ten castles -> a bucket for twenty castles
//! scares it off but unlocks fancy sandcastles -> a fancy sandcastle draws
//! helper crabs, who gather sand passively on a rising sand price.

use tidepool_core::catalog::{Catalog, CatalogBuilder, CatalogError};
use tidepool_core::condition::Condition;
use tidepool_core::cost::{CostTerm, Growth, Iterations, Price};
use tidepool_core::effect::Effect;
use tidepool_core::engine::DEBUG_FLAG;
use tidepool_core::milestone::MilestoneDef;
use tidepool_core::production::ProducerOp;
use tidepool_core::state::GlobalValue;
use tidepool_core::tab::{ActionDef, PaneElement, TabDef};

/// Chance per gather of turning up a rock.
pub const ROCK_CHANCE: f64 = 1.0 / 244.0;

/// Sand emitted per helper crab per tick.
pub const CRAB_SAND_PER_TICK: f64 = 0.05;

/// Build the full beach catalog.
pub fn build_catalog() -> Result<Catalog, CatalogError> {
    let mut b = CatalogBuilder::new();

    // -- Resources (visibility for the later ones is filled in below, once
    //    the flags they watch exist) --

    let sand = b.register_resource("sand", "Sand", "Sand", Condition::Always);
    let rocks = b.register_resource("rocks", "Rocks", "Rock", Condition::Always);
    let wet = b.register_resource("wet", "Wet", "Wet", Condition::Always);
    let sandcastles =
        b.register_resource("sandcastles", "Sandcastles", "Sandcastle", Condition::Always);
    let fancy = b.register_resource(
        "fancy_sandcastles",
        "Fancy Sandcastles",
        "Fancy Sandcastle",
        Condition::Always,
    );

    b.set_resource_visibility(
        wet,
        Condition::AmountAtLeast {
            resource: wet,
            min: 1.0,
        },
    );
    b.set_resource_visibility(
        fancy,
        Condition::AmountAtLeast {
            resource: fancy,
            min: 1.0,
        },
    );

    // -- Globals --

    let ocean_drained = b.register_flag("ocean_drained", GlobalValue::Bool(false));
    let bucket = b.register_flag("bucket", GlobalValue::Bool(false));
    let debug = b.register_flag(DEBUG_FLAG, GlobalValue::Bool(false));
    let sandcastle_plans = b.register_flag("sandcastle_plans", GlobalValue::Bool(false));
    let built_sandcastle = b.register_flag("built_sandcastle", GlobalValue::Bool(false));
    let crabitalist_here = b.register_flag("crabitalist_here", GlobalValue::Bool(false));
    let fancy_plans = b.register_flag("fancy_plans", GlobalValue::Bool(false));
    let crab_friends = b.register_flag("crab_friends", GlobalValue::Bool(false));

    // Sandcastles stay listed once the first one has ever been built, even
    // if every castle is later spent.
    b.set_resource_visibility(sandcastles, Condition::FlagSet(built_sandcastle));

    // -- Producers --

    let helper_crabs = b.register_producer(
        "helper_crabs",
        "Helper crabs",
        ProducerOp::Emit {
            resource: sand,
            per_unit: CRAB_SAND_PER_TICK,
        },
    );

    // -- Prices --

    let sandcastle_price = b.register_price(
        "sandcastle",
        Price::new(
            vec![CostTerm::new(sand, 10.0, Growth::Power(1.01))],
            Iterations::ResourceAmount(sandcastles),
        ),
    );
    let fancy_price = b.register_price(
        "fancy_sandcastle",
        Price::flat(vec![
            CostTerm::new(sand, 20.0, Growth::Constant),
            CostTerm::new(rocks, 2.0, Growth::Constant),
            CostTerm::new(sandcastles, 4.0, Growth::Constant),
        ]),
    );
    let bucket_price = b.register_price(
        "bucket",
        Price::flat(vec![CostTerm::new(sandcastles, 20.0, Growth::Constant)]),
    );
    // Each hired crab raises the sand ante, and fancier beaches mean
    // pickier crabs: the rock cost climbs with fancy sandcastles owned.
    let crab_price = b.register_price(
        "helper_crab",
        Price::new(
            vec![
                CostTerm::new(sand, 100.0, Growth::Power(1.05)),
                CostTerm::new(rocks, 1.0, Growth::AddOwned {
                    resource: fancy,
                    per: 1.0,
                }),
            ],
            Iterations::ProducerAmount(helper_crabs),
        ),
    );

    // -- Actions --

    let gather_sand = b.register_action(ActionDef {
        key: "gather_sand".into(),
        label: "Gather sand".into(),
        visible: Condition::Always,
        enabled: Condition::Always,
        price: None,
        effects: vec![
            Effect::Grant {
                resource: sand,
                amount: 1.0,
            },
            Effect::GrantRandom {
                resource: rocks,
                amount: 1.0,
                chance: ROCK_CHANCE,
                message: "You found a cool rock in the sand".into(),
            },
        ],
    });
    let cheat = b.register_action(ActionDef {
        key: "cheat".into(),
        label: "Cheat!".into(),
        visible: Condition::FlagSet(debug),
        enabled: Condition::Always,
        price: None,
        effects: vec![Effect::Grant {
            resource: sand,
            amount: 1000.0,
        }],
    });
    let make_sandcastle = b.register_action(ActionDef {
        key: "make_sandcastle".into(),
        label: "Build sandcastle".into(),
        visible: Condition::FlagSet(sandcastle_plans),
        enabled: Condition::CanAfford(sandcastle_price),
        price: Some(sandcastle_price),
        effects: vec![
            Effect::Spend(sandcastle_price),
            Effect::set_flag(built_sandcastle, true),
            Effect::Grant {
                resource: sandcastles,
                amount: 1.0,
            },
        ],
    });
    let make_fancy = b.register_action(ActionDef {
        key: "make_fancy_sandcastle".into(),
        label: "Build fancy sandcastle".into(),
        visible: Condition::FlagSet(fancy_plans),
        enabled: Condition::CanAfford(fancy_price),
        price: Some(fancy_price),
        effects: vec![
            Effect::Spend(fancy_price),
            Effect::Grant {
                resource: fancy,
                amount: 1.0,
            },
            Effect::log("You built a fancy sandcastle. The beach feels more distinguished."),
        ],
    });
    let attract_crab = b.register_action(ActionDef {
        key: "attract_crab".into(),
        label: "Attract helper crab".into(),
        visible: Condition::FlagSet(crab_friends),
        enabled: Condition::CanAfford(crab_price),
        price: Some(crab_price),
        effects: vec![
            Effect::Spend(crab_price),
            Effect::AddProducer {
                producer: helper_crabs,
                amount: 1.0,
            },
            Effect::log("A helper crab scuttles over and starts gathering sand"),
        ],
    });
    let gather_wet = b.register_action(ActionDef {
        key: "gather_wet".into(),
        label: "Gather wet".into(),
        visible: Condition::flag_clear(ocean_drained),
        enabled: Condition::Always,
        price: None,
        effects: vec![Effect::Grant {
            resource: wet,
            amount: 1.0,
        }],
    });
    let buy_bucket = b.register_action(ActionDef {
        key: "buy_bucket".into(),
        label: "Buy bucket".into(),
        visible: Condition::flag_clear(bucket),
        enabled: Condition::CanAfford(bucket_price),
        price: Some(bucket_price),
        effects: vec![
            Effect::Spend(bucket_price),
            Effect::log("You have acquired a bucket"),
            Effect::set_flag(bucket, true),
        ],
    });

    // -- Tabs (registration order is the auto-reroute order) --

    let beach = b.register_tab(TabDef {
        key: "beach".into(),
        name: "Beach".into(),
        text: "Sand and rocks line the beach".into(),
        visible: Condition::Always,
        elements: vec![PaneElement::Buttons {
            actions: vec![
                gather_sand,
                cheat,
                make_sandcastle,
                make_fancy,
                attract_crab,
            ],
            visible: Condition::Always,
        }],
    });
    let ocean = b.register_tab(TabDef {
        key: "ocean".into(),
        name: "Ocean".into(),
        text: "The ocean is blue".into(),
        visible: Condition::Always,
        elements: vec![
            PaneElement::Image {
                asset: "waves".into(),
                visible: Condition::flag_clear(ocean_drained),
            },
            PaneElement::Buttons {
                actions: vec![gather_wet],
                visible: Condition::Always,
            },
        ],
    });
    b.register_tab(TabDef {
        key: "crabitalist".into(),
        name: "Crabitalist".into(),
        text: "The crabitalist wishes to buy and sell your goods".into(),
        visible: Condition::All(vec![
            Condition::FlagSet(crabitalist_here),
            Condition::flag_clear(bucket),
        ]),
        elements: vec![
            PaneElement::Caption {
                text: "The crabitalist eyes your sandcastles".into(),
                visible: Condition::CanAfford(bucket_price),
            },
            PaneElement::Buttons {
                actions: vec![buy_bucket],
                visible: Condition::Always,
            },
        ],
    });
    b.set_default_tab(beach);

    // -- Milestones (evaluation order) --

    b.register_milestone(MilestoneDef::new(
        "sandcastle_plans",
        Condition::AmountAtLeast {
            resource: sand,
            min: 10.0,
        },
        vec![
            Effect::log("You have a little pile of sand. You could make a sandcastle out of it"),
            Effect::set_flag(sandcastle_plans, true),
            Effect::Deactivate,
        ],
    ));
    b.register_milestone(MilestoneDef::new(
        "ocean_runs_dry",
        Condition::AmountAtLeast {
            resource: wet,
            min: 99.0,
        },
        vec![
            Effect::log("Ocean ran out"),
            Effect::set_flag(ocean_drained, true),
            Effect::Deactivate,
        ],
    ));
    // The ocean's intro text is derived, so this pair re-checks on every
    // load as well as firing once in-session when the flag flips.
    b.register_milestone(
        MilestoneDef::new(
            "ocean_dry_text",
            Condition::FlagSet(ocean_drained),
            vec![
                Effect::SetTabText {
                    tab: ocean,
                    text: "The ocean is blue and dry".into(),
                },
                Effect::Deactivate,
            ],
        )
        .checked_on_load(),
    );
    b.register_milestone(
        MilestoneDef::new(
            "ocean_wet_text",
            Condition::flag_clear(ocean_drained),
            vec![
                Effect::SetTabText {
                    tab: ocean,
                    text: "The ocean is blue".into(),
                },
                Effect::Deactivate,
            ],
        )
        .checked_on_load(),
    );
    b.register_milestone(MilestoneDef::new(
        "crabitalist_arrives",
        Condition::AmountAtLeast {
            resource: sandcastles,
            min: 10.0,
        },
        vec![
            Effect::log("Your sandcastles have attracted the attention of a crabitalist"),
            Effect::set_flag(crabitalist_here, true),
            Effect::Deactivate,
        ],
    ));
    b.register_milestone(MilestoneDef::new(
        "crabitalist_flees",
        Condition::FlagSet(bucket),
        vec![
            Effect::log("The crabitalist has fled!"),
            Effect::set_flag(fancy_plans, true),
            Effect::Deactivate,
        ],
    ));
    b.register_milestone(MilestoneDef::new(
        "crab_admirers",
        Condition::AmountAtLeast {
            resource: fancy,
            min: 1.0,
        },
        vec![
            Effect::log("A curious crab admires your fancy sandcastle"),
            Effect::set_flag(crab_friends, true),
            Effect::Deactivate,
        ],
    ));

    b.build()
}
