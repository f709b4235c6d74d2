//! End-to-end game runs on virtual time
//! Every scenario drives a full countdown and draw through the public API.

use bingo_draw::{
    config::{SinkConfig, TimingConfig},
    games::{
        CodeGenerator, DrawScheduler, GameConfig, GameParams, ManualClock, SequenceBuilder,
        TimestampCodeGenerator, VirtualTimer,
    },
    sink::{EventPayload, MemorySink},
};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const START_MILLIS: u64 = 1_700_000_000_000;

fn sink_config() -> SinkConfig {
    SinkConfig {
        url: "http://sink.test/enviar-mensaje".to_string(),
        token: "token".to_string(),
        channel: "bingo_revendedor_jugador".to_string(),
        request_timeout_secs: 5,
    }
}

struct Harness {
    clock: Arc<ManualClock>,
    timer: VirtualTimer,
    sink: MemorySink,
    codes: TimestampCodeGenerator,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(START_MILLIS));
        Self {
            timer: VirtualTimer::new(clock.clone()),
            codes: TimestampCodeGenerator::with_seed(clock.clone(), 11),
            sink: MemorySink::new(),
            clock,
        }
    }

    fn scheduler(&self, params: serde_json::Value) -> DrawScheduler {
        let params: GameParams = serde_json::from_value(params).expect("valid params");
        let config = GameConfig::from_params(&params, &self.codes);
        let sequence = SequenceBuilder::new(StdRng::seed_from_u64(99))
            .build(config.custom_sequence.as_deref());
        DrawScheduler::new(config, sequence, sink_config(), &TimingConfig::default())
    }
}

fn ascending_csv() -> String {
    (1..=75).map(|n| n.to_string()).collect::<Vec<_>>().join(",")
}

fn countdown_values(payloads: &[EventPayload]) -> Vec<u32> {
    payloads
        .iter()
        .filter_map(|p| match p {
            EventPayload::Countdown(c) => Some(c.remaining_minutes),
            EventPayload::Draw(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_custom_ascending_game() {
    let harness = Harness::new();
    let mut scheduler = harness.scheduler(json!({
        "codigo": "g1",
        "start_in": 0,
        "intervalo": 1,
        "numeracion": ascending_csv(),
    }));
    assert_eq!(scheduler.sequence().numbers(), (1..=75).collect::<Vec<u8>>());

    let summary = scheduler
        .start(&harness.timer, harness.clock.as_ref(), &harness.sink)
        .await
        .expect("game should complete");

    let payloads = harness.sink.attempted_payloads();
    assert_eq!(payloads.len(), 76);
    assert_eq!(countdown_values(&payloads), vec![0]);
    assert!(matches!(payloads[0], EventPayload::Countdown(_)));

    let letters = ["B", "I", "N", "G", "O"];
    for (index, payload) in payloads[1..].iter().enumerate() {
        let number = index + 1;
        let expected = format!("{}{}", letters[index / 15], number);
        match payload {
            EventPayload::Draw(draw) => {
                assert_eq!(draw.number, expected);
                assert_eq!(draw.sequence_position, number);
            }
            other => panic!("expected a draw, got {:?}", other),
        }
    }

    assert!(harness.sink.envelopes().iter().all(|e| e.event == "g1"));
    assert_eq!(summary.code, "g1");
    assert_eq!(summary.total_drawn, 75);
    assert_eq!(summary.drawn_labels.first().map(String::as_str), Some("B1 (1/75)"));
    assert_eq!(summary.drawn_labels.last().map(String::as_str), Some("O75 (75/75)"));
}

#[tokio::test]
async fn test_draws_are_spaced_by_interval() {
    let harness = Harness::new();
    let mut scheduler = harness.scheduler(json!({ "codigo": "spaced", "intervalo": 3 }));

    scheduler
        .start(&harness.timer, harness.clock.as_ref(), &harness.sink)
        .await
        .expect("game should complete");

    // pre-draw wait plus one pause between each pair of draws
    let waits = harness.timer.waits();
    assert_eq!(waits.len(), 75);
    assert!(waits.iter().all(|w| *w >= Duration::from_secs(3)));

    let draw_times: Vec<u64> = harness
        .sink
        .attempted_payloads()
        .iter()
        .filter_map(|p| match p {
            EventPayload::Draw(d) => Some(d.time_utc),
            EventPayload::Countdown(_) => None,
        })
        .collect();
    assert_eq!(draw_times.len(), 75);
    assert!(draw_times.windows(2).all(|w| w[1] - w[0] >= 3));
}

#[tokio::test]
async fn test_countdown_before_draws() {
    let harness = Harness::new();
    let mut scheduler = harness.scheduler(json!({ "codigo": "cd", "start_in": 2, "intervalo": 1 }));

    scheduler
        .start(&harness.timer, harness.clock.as_ref(), &harness.sink)
        .await
        .expect("game should complete");

    let payloads = harness.sink.attempted_payloads();
    assert_eq!(countdown_values(&payloads), vec![2, 1, 0]);
    assert!(payloads[..3].iter().all(|p| matches!(p, EventPayload::Countdown(_))));
    assert_eq!(payloads.len(), 3 + 75);

    let waits = harness.timer.waits();
    assert_eq!(&waits[..2], &[Duration::from_secs(60), Duration::from_secs(60)]);
}

#[tokio::test]
async fn test_generated_code_is_used_for_every_message() {
    let harness = Harness::new();
    let mut scheduler = harness.scheduler(json!({ "start_in": 0, "intervalo": 1 }));
    let code = scheduler.config().code.clone();

    let parts: Vec<&str> = code.split('_').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "bg");
    assert_eq!(parts[1], START_MILLIS.to_string());
    assert!(parts[2].parse::<u32>().map(|n| n < 10_000).unwrap_or(false));

    scheduler
        .start(&harness.timer, harness.clock.as_ref(), &harness.sink)
        .await
        .expect("game should complete");

    let envelopes = harness.sink.envelopes();
    assert_eq!(envelopes.len(), 76);
    assert!(envelopes.iter().all(|e| e.event == code));
}

#[tokio::test]
async fn test_invalid_custom_sequence_still_draws_all_balls() {
    let harness = Harness::new();
    let mut scheduler = harness.scheduler(json!({
        "codigo": "dup",
        "intervalo": 1,
        "numeracion": ascending_csv().replace(",75", ",1"),
    }));

    let summary = scheduler
        .start(&harness.timer, harness.clock.as_ref(), &harness.sink)
        .await
        .expect("game should complete");

    let mut numbers: Vec<u8> = scheduler
        .draw_result()
        .draws()
        .iter()
        .map(|d| d.item.number())
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=75).collect::<Vec<u8>>());
    assert_eq!(summary.total_drawn, 75);
}

#[tokio::test]
async fn test_partial_sink_outage() {
    let harness = Harness::new();
    harness.sink.fail_attempts(0..10);
    let mut scheduler = harness.scheduler(json!({ "codigo": "outage", "intervalo": 1 }));

    let summary = scheduler
        .start(&harness.timer, harness.clock.as_ref(), &harness.sink)
        .await
        .expect("sink failures must not abort the game");

    assert_eq!(harness.sink.attempt_count(), 76);
    assert_eq!(harness.sink.envelopes().len(), 66);
    assert_eq!(summary.total_drawn, 75);
}

#[test]
fn test_code_generator_is_injectable() {
    struct Fixed;
    impl CodeGenerator for Fixed {
        fn generate(&self) -> String {
            "fixed-code".to_string()
        }
    }

    let config = GameConfig::from_params(&GameParams::default(), &Fixed);
    assert_eq!(config.code, "fixed-code");
}
