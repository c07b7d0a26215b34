//! Schema for the demo app.
//!
//! Touches every value kind, nested sections and validators so that
//! `config gen` shows the full file layout.

use snapfig::{Declare, IntMap, Record, Schema, SnapfigError, TextMap, Validator};

fn reward(item: &str, amount: i64) -> Record {
    let mut record = Record::new();
    record.insert("item".into(), item.into());
    record.insert("amount".into(), amount.into());
    record
}

pub fn abilities() -> Result<Schema, SnapfigError> {
    Schema::builder("abilities")
        .header("Abilities Configuration\n\nEdit, then run `config list` to check.")
        .bool_value("abilities-enabled", true, "Master toggle for all abilities")
        .section("keraunos")
        .header("Lightning strike")
        .int_value_with("cooldown", 10, Validator::range(0, 300), "Cooldown in seconds")
        .double_value_with("radius", 3.0, Validator::min(0.0), "Effect radius in blocks")
        .section("knockback")
        .double_value("horizontal", 0.8, "")
        .double_value("vertical", 1.0, "")
        .parent()
        .text_list_with(
            "allowed-items",
            ["DIAMOND_SWORD", "IRON_SWORD"],
            Validator::all_not_empty(),
            "Items that trigger the strike",
        )
        .int_list_with("damage-steps", [1, 5, 10], Validator::all_in_range(0, 100), "")
        .end()
        .section("medkit")
        .header("Portable healing")
        .int_value_with("charges", 3, Validator::range(1, 10), "Total charges")
        .double_list("heal-amounts", [2.0, 4.0], "Health restored per tier")
        .record_list("rewards", vec![reward("GOLDEN_APPLE", 1)], "Items granted on use")
        .text_map(
            "messages",
            TextMap::from([
                ("use".to_string(), "Healed!".to_string()),
                ("empty".to_string(), "No charges left".to_string()),
            ]),
            "",
        )
        .int_map(
            "limits",
            IntMap::from([("daily".to_string(), 5), ("hourly".to_string(), 2)]),
            "Uses per period",
        )
        .end()
        .text_value_with(
            "color",
            "yellow",
            Validator::one_of(["red", "green", "yellow", "blue"]),
            "Output color for `show`",
        )
        .text_value_with("motd", "Welcome", Validator::not_empty(), "Message of the day")
        .build()
}
