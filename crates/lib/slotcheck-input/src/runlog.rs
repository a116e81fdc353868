use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use slotcheck_core::clock::Clock;
use slotcheck_core::event::{EnergyStat, PredicateEvent, RimeStat, Slot, TdmaStat, TxRx};
use slotcheck_core::hashbrown::HashSet;
use slotcheck_core::mote::{CompositeId, MoteId};
use slotcheck_core::run::RunLog;

use crate::error::InputError;

const MOTES: &str = "motes";
const STATS: &str = "stats";
const RIME: &str = "rime";
const ENERGY: &str = "energy";
const TDMA: &str = "TDMA";
const PREDICATE: &str = "predicate";

/// A raw log record that can be turned into one of the typed events.
trait Record: DeserializeOwned {
    type Event;
    fn into_event(self) -> Result<Self::Event, String>;
}

#[derive(Deserialize)]
struct RimeRecord {
    #[serde(rename = "S")]
    mote: MoteId,
    clock: Clock,
    tx: i64,
    rx: i64,
}

impl Record for RimeRecord {
    type Event = RimeStat;

    fn into_event(self) -> Result<RimeStat, String> {
        Ok(RimeStat::builder()
            .mote(self.mote)
            .clock(self.clock)
            .counts(TxRx::builder().tx(self.tx).rx(self.rx).build())
            .build())
    }
}

#[derive(Deserialize)]
struct EnergyRecord {
    #[serde(rename = "E")]
    mote: MoteId,
    clock: Clock,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl Record for EnergyRecord {
    type Event = EnergyStat;

    fn into_event(self) -> Result<EnergyStat, String> {
        let fields = self
            .fields
            .into_iter()
            .map(|(name, value)| match value.as_i64() {
                Some(counter) => Ok((name, counter)),
                None => Err(format!("counter {} is not an integer: {}", name, value)),
            })
            .collect::<Result<BTreeMap<String, i64>, String>>()?;
        Ok(EnergyStat::builder()
            .mote(self.mote)
            .clock(self.clock)
            .fields(fields)
            .build())
    }
}

#[derive(Deserialize)]
struct TdmaRecord {
    #[serde(rename = "STDMA")]
    mote: MoteId,
    clock: Clock,
    slot: i64,
    tx: i64,
    rx: i64,
}

impl Record for TdmaRecord {
    type Event = TdmaStat;

    fn into_event(self) -> Result<TdmaStat, String> {
        Ok(TdmaStat::builder()
            .mote(self.mote)
            .clock(self.clock)
            .slot(Slot::from(self.slot))
            .counts(TxRx::builder().tx(self.tx).rx(self.rx).build())
            .build())
    }
}

#[derive(Deserialize)]
struct PredicateRecord {
    on: MoteId,
    node: CompositeId,
    clock: Clock,
    result: Value,
}

impl Record for PredicateRecord {
    type Event = PredicateEvent;

    fn into_event(self) -> Result<PredicateEvent, String> {
        let result = match &self.result {
            Value::Bool(flag) => *flag,
            Value::Number(number) => match number.as_i64() {
                Some(0) => false,
                Some(1) => true,
                _ => return Err(format!("unexpected result {}", number)),
            },
            other => return Err(format!("unexpected result {}", other)),
        };
        Ok(PredicateEvent::builder()
            .on(self.on)
            .node(self.node)
            .clock(self.clock)
            .result(result)
            .build())
    }
}

/// Reads a run log from disk. Files with a `gz` extension are decompressed on the fly.
pub fn read_run_log(file_path: &Path) -> Result<RunLog, InputError> {
    let io_error = |source| InputError::Io {
        path: file_path.to_path_buf(),
        source,
    };
    let file = File::open(file_path).map_err(io_error)?;
    let mut content = Vec::new();
    match file_path.extension().and_then(|ext| ext.to_str()) {
        Some("gz") => GzDecoder::new(BufReader::new(file))
            .read_to_end(&mut content)
            .map_err(io_error)?,
        _ => BufReader::new(file)
            .read_to_end(&mut content)
            .map_err(io_error)?,
    };
    debug!("Read {} bytes from {}", content.len(), file_path.display());
    parse_run_log(&content)
}

/// Parses the JSON document written by the log gathering script of a run.
///
/// Incomplete records are dropped with a warning and counted in [`RunLog::dropped`]. Missing
/// `stats`, `stats.rime`, `stats.TDMA` or `predicate` sections make the whole log unusable.
pub fn parse_run_log(content: &[u8]) -> Result<RunLog, InputError> {
    let document: Value = serde_json::from_slice(content)?;
    let mut root = match document {
        Value::Object(map) => map,
        _ => return Err(InputError::MalformedLog("top level is not an object".to_string())),
    };

    let mut stats = match root.remove(STATS) {
        Some(Value::Object(map)) => map,
        _ => return Err(InputError::MalformedLog(format!("{} section missing", STATS))),
    };

    let mut dropped = 0;
    let rime = read_records::<RimeRecord>(RIME, required(&mut stats, RIME)?, &mut dropped);
    let tdma = read_records::<TdmaRecord>(TDMA, required(&mut stats, TDMA)?, &mut dropped);
    let energy = match stats.remove(ENERGY) {
        Some(Value::Array(values)) => read_records::<EnergyRecord>(ENERGY, values, &mut dropped),
        _ => {
            warn!("No {} stream in the run log", ENERGY);
            Vec::new()
        }
    };
    let predicates =
        read_records::<PredicateRecord>(PREDICATE, required(&mut root, PREDICATE)?, &mut dropped);

    let motes = match root.remove(MOTES) {
        Some(Value::Array(values)) => read_motes(values, &mut dropped),
        _ => {
            debug!("No mote list in the run log, using the motes of the rime stream");
            motes_of(&rime)
        }
    };

    Ok(RunLog::builder()
        .motes(motes)
        .rime(rime)
        .energy(energy)
        .tdma(tdma)
        .predicates(predicates)
        .dropped(dropped)
        .build())
}

fn required(section: &mut Map<String, Value>, name: &str) -> Result<Vec<Value>, InputError> {
    match section.remove(name) {
        Some(Value::Array(values)) => Ok(values),
        Some(_) => Err(InputError::MalformedLog(format!("{} is not a list", name))),
        None => Err(InputError::MalformedLog(format!("{} section missing", name))),
    }
}

fn read_records<R: Record>(
    stream: &str,
    values: Vec<Value>,
    dropped: &mut usize,
) -> Vec<R::Event> {
    let mut events = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let event = serde_json::from_value::<R>(value)
            .map_err(|e| e.to_string())
            .and_then(R::into_event);
        match event {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!("Dropping {} record {}: {}", stream, index, e);
                *dropped += 1;
            }
        }
    }
    events
}

fn read_motes(values: Vec<Value>, dropped: &mut usize) -> Vec<MoteId> {
    let mut motes = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<MoteId>(value) {
            Ok(mote) => motes.push(mote),
            Err(e) => {
                warn!("Dropping entry of the mote list: {}", e);
                *dropped += 1;
            }
        }
    }
    motes
}

fn motes_of(rime: &[RimeStat]) -> Vec<MoteId> {
    let unique: HashSet<MoteId> = rime.iter().map(|stat| stat.mote).collect();
    let mut motes: Vec<MoteId> = unique.into_iter().collect();
    motes.sort();
    motes
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_RUN: &str = r#"{
        "motes": [1, 2],
        "stats": {
            "rime": [
                {"S": 1, "clock": 10, "tx": 4, "rx": 7},
                {"S": 2, "clock": 11, "tx": 5, "rx": 3}
            ],
            "energy": [{"E": 1, "clock": 10, "cpu": 120, "lpm": 900}],
            "TDMA": [
                {"STDMA": 1, "clock": 10, "slot": 2, "tx": 1, "rx": 2},
                {"STDMA": 2, "clock": 10, "slot": 3, "tx": 1, "rx": 1}
            ]
        },
        "predicate": [
            {"on": 2, "node": "1.0", "clock": 12, "result": 1},
            {"on": 1, "node": "1.0", "clock": 13, "result": 0}
        ]
    }"#;

    #[test]
    fn parses_all_streams() {
        let run = parse_run_log(SMALL_RUN.as_bytes()).unwrap();
        assert_eq!(run.motes, vec![MoteId::from(1), MoteId::from(2)]);
        assert_eq!(run.rime.len(), 2);
        assert_eq!(run.tdma.len(), 2);
        assert_eq!(run.energy.len(), 1);
        assert_eq!(run.energy[0].fields["cpu"], 120);
        assert_eq!(run.predicates.len(), 2);
        assert_eq!(run.predicates[0].origin(), MoteId::from(1));
        assert!(run.predicates[0].result);
        assert!(!run.predicates[1].result);
        assert_eq!(run.dropped, 0);
    }

    #[test]
    fn incomplete_records_are_dropped() {
        let content = SMALL_RUN.replace(
            r#"{"S": 2, "clock": 11, "tx": 5, "rx": 3}"#,
            r#"{"S": 2, "tx": 5}"#,
        );
        let run = parse_run_log(content.as_bytes()).unwrap();
        assert_eq!(run.rime.len(), 1);
        assert_eq!(run.dropped, 1);
    }

    #[test]
    fn unexpected_result_is_dropped() {
        let content = SMALL_RUN.replace(r#""result": 0"#, r#""result": 7"#);
        let run = parse_run_log(content.as_bytes()).unwrap();
        assert_eq!(run.predicates.len(), 1);
        assert_eq!(run.dropped, 1);
    }

    #[test]
    fn energy_record_with_non_integer_counter_is_dropped() {
        let content = SMALL_RUN.replace(
            r#"{"E": 1, "clock": 10, "cpu": 120, "lpm": 900}"#,
            r#"{"E": 1, "clock": 10, "cpu": "12", "lpm": 1.5, "tx": 7},
               {"E": 2, "clock": 10, "cpu": 80}"#,
        );
        let run = parse_run_log(content.as_bytes()).unwrap();
        assert_eq!(run.energy.len(), 1);
        assert_eq!(run.energy[0].mote, MoteId::from(2));
        assert_eq!(run.dropped, 1);
    }

    #[test]
    fn missing_tdma_stream_fails() {
        let content = SMALL_RUN.replace(r#""TDMA""#, r#""other""#);
        assert!(matches!(
            parse_run_log(content.as_bytes()),
            Err(InputError::MalformedLog(_))
        ));
    }

    #[test]
    fn mote_list_falls_back_to_rime_stream() {
        let content = SMALL_RUN.replace(r#""motes": [1, 2],"#, "");
        let run = parse_run_log(content.as_bytes()).unwrap();
        assert_eq!(run.motes, vec![MoteId::from(1), MoteId::from(2)]);
    }

    #[test]
    fn invalid_json_fails() {
        assert!(matches!(
            parse_run_log(b"{ not json"),
            Err(InputError::Json(_))
        ));
    }
}
