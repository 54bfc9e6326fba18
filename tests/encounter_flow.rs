//! End-to-end encounter flows: add, roll, cycle turns, adjust, clear

mod common;

use common::TrackdTest;
use serde_json::{json, Value};

async fn roster(trackd: &TrackdTest) -> Vec<Value> {
    trackd
        .get("/api/characters")
        .await
        .expect("Failed to list roster")
        .json::<Vec<Value>>()
        .await
        .expect("Failed to parse roster")
}

/// Add a declared-initiative player and a group of goblins
async fn setup_party(trackd: &TrackdTest) {
    let resp = trackd
        .post(
            "/api/characters",
            &json!({"name": "Thia", "type": "player", "initiative": 15, "hp": 24}),
        )
        .await
        .expect("Failed to add player");
    assert_eq!(resp.status(), 201);

    let resp = trackd
        .post(
            "/api/characters",
            &json!({
                "name": "Goblin",
                "type": "enemy",
                "count": 3,
                "hp": 7,
                "initiativeModifier": 2,
                "ac": 15
            }),
        )
        .await
        .expect("Failed to add goblins");
    assert_eq!(resp.status(), 201);

    let created: Vec<Value> = resp.json().await.expect("Failed to parse created");
    assert_eq!(created.len(), 3);
    assert_eq!(created[0]["name"], "Goblin 1");
    assert_eq!(created[1]["name"], "Goblin 2");
    assert_eq!(created[2]["name"], "Goblin 3");
}

#[tokio::test]
async fn test_roll_sorts_and_keeps_player_initiative() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");
    setup_party(&trackd).await;

    let resp = trackd
        .post("/api/encounter/roll", &json!({}))
        .await
        .expect("Failed to roll");
    assert_eq!(resp.status(), 200);
    let rolled: Vec<Value> = resp.json().await.expect("Failed to parse roll");

    assert_eq!(rolled.len(), 4);

    // Sorted descending by initiative, tie-breaker deciding equal values
    for pair in rolled.windows(2) {
        let (a_init, b_init) = (
            pair[0]["initiative"].as_i64().unwrap(),
            pair[1]["initiative"].as_i64().unwrap(),
        );
        assert!(
            a_init > b_init
                || (a_init == b_init
                    && pair[0]["tieBreaker"].as_i64().unwrap()
                        >= pair[1]["tieBreaker"].as_i64().unwrap())
        );
    }

    // The player kept the declared 15
    let thia = rolled.iter().find(|c| c["name"] == "Thia").unwrap();
    assert_eq!(thia["initiative"], 15);

    // Goblins rolled within d20 + modifier bounds
    for goblin in rolled.iter().filter(|c| c["type"] == "enemy") {
        let initiative = goblin["initiative"].as_i64().unwrap();
        assert!((3..=22).contains(&initiative));
    }

    // Rolling ends any turn in progress
    assert!(rolled.iter().all(|c| c["isTurn"] == false));
}

#[tokio::test]
async fn test_turn_cycle_over_http() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");
    setup_party(&trackd).await;
    trackd
        .post("/api/encounter/roll", &json!({}))
        .await
        .expect("Failed to roll");

    // First advance lands on the top of the order
    let first: Value = trackd
        .post("/api/encounter/next-turn", &json!({}))
        .await
        .expect("Failed to advance")
        .json()
        .await
        .expect("Failed to parse active");
    let top = &roster(&trackd).await[0];
    assert_eq!(first["id"], top["id"]);

    // Exactly one combatant is flagged after each advance
    for _ in 0..5 {
        trackd
            .post("/api/encounter/next-turn", &json!({}))
            .await
            .expect("Failed to advance");
        let flagged = roster(&trackd)
            .await
            .iter()
            .filter(|c| c["isTurn"] == true)
            .count();
        assert_eq!(flagged, 1);
    }

    // N more advances come back around to the same combatant
    let before = roster(&trackd).await;
    let active_before = before.iter().find(|c| c["isTurn"] == true).unwrap()["id"].clone();
    for _ in 0..before.len() {
        trackd
            .post("/api/encounter/next-turn", &json!({}))
            .await
            .expect("Failed to advance");
    }
    let after = roster(&trackd).await;
    let active_after = after.iter().find(|c| c["isTurn"] == true).unwrap()["id"].clone();
    assert_eq!(active_before, active_after);
}

#[tokio::test]
async fn test_next_turn_on_empty_roster() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");

    let active: Value = trackd
        .post("/api/encounter/next-turn", &json!({}))
        .await
        .expect("Failed to advance")
        .json()
        .await
        .expect("Failed to parse");
    assert!(active.is_null());
}

#[tokio::test]
async fn test_hp_adjust_is_unclamped() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");
    setup_party(&trackd).await;

    let goblin_id = roster(&trackd).await[1]["id"].as_str().unwrap().to_string();

    let resp = trackd
        .put(
            &format!("/api/characters/{}", goblin_id),
            &json!({"op": "adjust_hp", "delta": -5}),
        )
        .await
        .expect("Failed to adjust hp");
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.expect("Failed to parse");
    assert_eq!(updated["hp"], 2);
    assert_eq!(updated["maxHp"], 7);

    // Below zero is allowed
    let updated: Value = trackd
        .put(
            &format!("/api/characters/{}", goblin_id),
            &json!({"op": "adjust_hp", "delta": -5}),
        )
        .await
        .expect("Failed to adjust hp")
        .json()
        .await
        .expect("Failed to parse");
    assert_eq!(updated["hp"], -3);
}

#[tokio::test]
async fn test_initiative_edit_resorts_roster() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");

    trackd
        .post(
            "/api/characters",
            &json!({"name": "A", "type": "player", "initiative": 10}),
        )
        .await
        .expect("Failed to add A");
    trackd
        .post(
            "/api/characters",
            &json!({"name": "B", "type": "player", "initiative": 8}),
        )
        .await
        .expect("Failed to add B");

    let b_id = roster(&trackd).await[1]["id"].as_str().unwrap().to_string();

    let resp = trackd
        .put(
            &format!("/api/characters/{}", b_id),
            &json!({"op": "set_initiative", "value": 20}),
        )
        .await
        .expect("Failed to set initiative");
    assert_eq!(resp.status(), 200);

    let order: Vec<String> = roster(&trackd)
        .await
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(order, ["B", "A"]);
}

#[tokio::test]
async fn test_update_unknown_character() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");

    let resp = trackd
        .put(
            &format!("/api/characters/{}", uuid::Uuid::new_v4()),
            &json!({"op": "rename", "name": "Ghost"}),
        )
        .await
        .expect("Failed to send update");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_drag_reorder() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");
    setup_party(&trackd).await;

    let mut ids: Vec<String> = roster(&trackd)
        .await
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    ids.reverse();

    let resp = trackd
        .put("/api/encounter/order", &json!({"order": ids}))
        .await
        .expect("Failed to reorder");
    assert_eq!(resp.status(), 200);

    let reordered: Vec<String> = roster(&trackd)
        .await
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(reordered, ids);

    // A stale permutation is rejected and changes nothing
    let resp = trackd
        .put(
            "/api/encounter/order",
            &json!({"order": [uuid::Uuid::new_v4()]}),
        )
        .await
        .expect("Failed to send reorder");
    assert_eq!(resp.status(), 409);
    let unchanged: Vec<String> = roster(&trackd)
        .await
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(unchanged, ids);
}

#[tokio::test]
async fn test_clear_requires_confirmation() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");
    setup_party(&trackd).await;

    // Declined: nothing happens, no error
    let resp = trackd
        .post(
            "/api/encounter/clear",
            &json!({"scope": "all", "confirm": false}),
        )
        .await
        .expect("Failed to send clear");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to parse");
    assert_eq!(body["cleared"], false);
    assert_eq!(roster(&trackd).await.len(), 4);

    // Confirmed enemy clear leaves the player
    let body: Value = trackd
        .post(
            "/api/encounter/clear",
            &json!({"scope": "enemies", "confirm": true}),
        )
        .await
        .expect("Failed to clear enemies")
        .json()
        .await
        .expect("Failed to parse");
    assert_eq!(body["cleared"], true);

    let remaining = roster(&trackd).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["name"], "Thia");

    // Confirmed full clear empties the roster
    trackd
        .post(
            "/api/encounter/clear",
            &json!({"scope": "all", "confirm": true}),
        )
        .await
        .expect("Failed to clear all");
    assert!(roster(&trackd).await.is_empty());
}

#[tokio::test]
async fn test_dice_roll_endpoint() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");

    let resp = trackd
        .post("/api/roll", &json!({"notation": "2d6+3"}))
        .await
        .expect("Failed to roll dice");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to parse");
    assert_eq!(body["notation"], "2d6+3");
    let total = body["total"].as_i64().unwrap();
    assert!((5..=15).contains(&total));

    let resp = trackd
        .post("/api/roll", &json!({"notation": "garbage"}))
        .await
        .expect("Failed to send roll");
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_hp_shortcuts_config() {
    let trackd = TrackdTest::start().await.expect("Failed to start server");

    let shortcuts: Vec<i64> = trackd
        .get("/api/config/hp-shortcuts")
        .await
        .expect("Failed to get shortcuts")
        .json()
        .await
        .expect("Failed to parse");
    assert_eq!(shortcuts, vec![-1, -5, -10, 1, 5]);
}
