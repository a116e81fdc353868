use std::fs;
use std::path::Path;

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;

use slotcheck_core::mote::{MoteId, Point2D};
use slotcheck_core::neighbours::{NeighbourGraph, Positions};

use crate::error::InputError;

/// Static layout of a simulated network: where every mote is and how far a radio reaches.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    pub range: f64,
    pub positions: Positions,
}

impl Topology {
    pub fn neighbour_graph(&self) -> Result<NeighbourGraph, InputError> {
        Ok(NeighbourGraph::build(&self.positions, self.range)?)
    }

    /// Parses a COOJA simulation description (`.csc`). The transmission range is read from
    /// the radio medium and each mote contributes its id and x/y coordinates from its
    /// interface configuration blocks.
    pub fn from_csc(content: &str) -> Result<Self, InputError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut path: Vec<String> = Vec::new();
        let mut range: Option<f64> = None;
        let mut positions = Positions::new();
        let mut mote = PartialMote::default();

        loop {
            match reader.read_event() {
                Err(e) => {
                    return Err(InputError::MalformedTopology(format!(
                        "XML error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                Ok(Event::Start(tag)) => {
                    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                    if name == "mote" && in_simulation(&path) {
                        mote = PartialMote::default();
                    }
                    path.push(name);
                }
                Ok(Event::End(_)) => {
                    let closed = path.pop();
                    if closed.as_deref() == Some("mote") && in_simulation(&path) {
                        let (id, point) = mote.finish(positions.len())?;
                        if positions.insert(id, point).is_some() {
                            warn!("Mote {} is defined more than once, keeping the last", id);
                        }
                    }
                }
                Ok(Event::Text(text)) => {
                    let value = text
                        .unescape()
                        .map_err(|e| InputError::MalformedTopology(e.to_string()))?;
                    let tail: Vec<&str> = path.iter().skip(1).map(String::as_str).collect();
                    match tail.as_slice() {
                        ["simulation", "radiomedium", "transmitting_range"] => {
                            range = Some(parse_number("transmitting_range", &value)?);
                        }
                        ["simulation", "mote", "interface_config", "id"] => {
                            let id = value.trim().parse::<MoteId>().map_err(|_| {
                                InputError::MalformedTopology(format!("invalid mote id {}", value))
                            })?;
                            mote.id = Some(id);
                        }
                        ["simulation", "mote", "interface_config", "x"] => {
                            mote.x = Some(parse_number("x", &value)?);
                        }
                        ["simulation", "mote", "interface_config", "y"] => {
                            mote.y = Some(parse_number("y", &value)?);
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                _ => {}
            }
        }

        let range = range.ok_or_else(|| {
            InputError::MalformedTopology("transmitting_range is missing".to_string())
        })?;
        debug!("Read {} motes with range {}", positions.len(), range);
        Ok(Self { range, positions })
    }
}

pub fn read_topology(file_path: &Path) -> Result<Topology, InputError> {
    let content = fs::read_to_string(file_path).map_err(|source| InputError::Io {
        path: file_path.to_path_buf(),
        source,
    })?;
    Topology::from_csc(&content)
}

fn in_simulation(path: &[String]) -> bool {
    path.len() == 2 && path[1] == "simulation"
}

fn parse_number(field: &str, value: &str) -> Result<f64, InputError> {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(InputError::MalformedTopology(format!(
            "invalid {} value {}",
            field, value
        ))),
    }
}

#[derive(Default)]
struct PartialMote {
    id: Option<MoteId>,
    x: Option<f64>,
    y: Option<f64>,
}

impl PartialMote {
    fn finish(&self, index: usize) -> Result<(MoteId, Point2D), InputError> {
        let id = self.id.ok_or_else(|| {
            InputError::MalformedTopology(format!("mote number {} has no id", index + 1))
        })?;
        match (self.x, self.y) {
            (Some(x), Some(y)) => Ok((id, Point2D::builder().x(x).y(y).build())),
            _ => Err(InputError::MalformedTopology(format!(
                "mote {} has no complete coordinate",
                id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MOTES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<simconf>
  <project EXPORT="discard">[APPS_DIR]/mrm</project>
  <simulation>
    <title>TDMA</title>
    <radiomedium>
      se.sics.cooja.radiomediums.UDGM
      <transmitting_range>50.0</transmitting_range>
      <interference_range>100.0</interference_range>
    </radiomedium>
    <mote>
      <breakpoints />
      <interface_config>
        se.sics.cooja.interfaces.Position
        <x>10.0</x>
        <y>20.0</y>
        <z>0.0</z>
      </interface_config>
      <interface_config>
        se.sics.cooja.mspmote.interfaces.MspMoteID
        <id>1</id>
      </interface_config>
      <motetype_identifier>sky1</motetype_identifier>
    </mote>
    <mote>
      <interface_config>
        se.sics.cooja.interfaces.Position
        <x>40.0</x>
        <y>60.0</y>
      </interface_config>
      <interface_config>
        se.sics.cooja.mspmote.interfaces.MspMoteID
        <id>2</id>
      </interface_config>
    </mote>
  </simulation>
</simconf>"#;

    #[test]
    fn reads_range_and_positions() {
        let topology = Topology::from_csc(TWO_MOTES).unwrap();
        assert_eq!(topology.range, 50.0);
        assert_eq!(topology.positions.len(), 2);
        let second = topology.positions[&MoteId::from(2)];
        assert_eq!(second.x, 40.0);
        assert_eq!(second.y, 60.0);
    }

    #[test]
    fn builds_neighbour_graph() {
        let graph = Topology::from_csc(TWO_MOTES)
            .unwrap()
            .neighbour_graph()
            .unwrap();
        assert!(graph.contains(&MoteId::from(1), &MoteId::from(2)));
    }

    #[test]
    fn missing_range_is_malformed() {
        let content = TWO_MOTES.replace("<transmitting_range>50.0</transmitting_range>", "");
        assert!(matches!(
            Topology::from_csc(&content),
            Err(InputError::MalformedTopology(_))
        ));
    }

    #[test]
    fn missing_coordinate_is_malformed() {
        let content = TWO_MOTES.replace("<y>60.0</y>", "");
        assert!(matches!(
            Topology::from_csc(&content),
            Err(InputError::MalformedTopology(_))
        ));
    }

    #[test]
    fn unparseable_coordinate_is_malformed() {
        let content = TWO_MOTES.replace("<x>10.0</x>", "<x>ten</x>");
        assert!(matches!(
            Topology::from_csc(&content),
            Err(InputError::MalformedTopology(_))
        ));
    }

    #[test]
    fn non_finite_values_are_malformed() {
        for (from, to) in [
            ("<x>10.0</x>", "<x>NaN</x>"),
            ("<x>40.0</x>", "<x>inf</x>"),
            (
                "<transmitting_range>50.0</transmitting_range>",
                "<transmitting_range>-inf</transmitting_range>",
            ),
        ] {
            let content = TWO_MOTES.replace(from, to);
            assert!(matches!(
                Topology::from_csc(&content),
                Err(InputError::MalformedTopology(_))
            ));
        }
    }
}
