//! Homie v3 topic layout and device advertisement.
//!
//! ```text
//! homie/aquarium/NPK_1/on/set   <- command payload
//! homie/aquarium/NPK_1/on       -> "5" | "false"
//! ```

/// Homie convention version advertised as `$homie`.
pub const HOMIE_VERSION: &str = "3.0.1";
/// Property every pump node exposes.
pub const PROPERTY: &str = "on";
/// Node `$type`.
pub const NODE_TYPE: &str = "pump";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomieTopics {
    base: String,
    device: String,
}

impl HomieTopics {
    pub fn new(base: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            device: device.into(),
        }
    }

    /// `<base>/<device>`
    pub fn device_root(&self) -> String {
        format!("{}/{}", self.base, self.device)
    }

    /// Device attribute topic, e.g. `$state`.
    pub fn attribute(&self, attr: &str) -> String {
        format!("{}/{}", self.device_root(), attr)
    }

    pub fn state_topic(&self, node: &str) -> String {
        format!("{}/{}/{}", self.device_root(), node, PROPERTY)
    }

    pub fn set_topic(&self, node: &str) -> String {
        format!("{}/set", self.state_topic(node))
    }

    /// Filter matching every node's command topic.
    pub fn command_filter(&self) -> String {
        self.set_topic("+")
    }

    /// Node id of a command topic, `None` for anything else.
    pub fn node_of_set_topic<'a>(&self, topic: &'a str) -> Option<&'a str> {
        let rest = topic
            .strip_prefix(self.base.as_str())?
            .strip_prefix('/')?
            .strip_prefix(self.device.as_str())?
            .strip_prefix('/')?;
        let node = rest.strip_suffix("/set")?.strip_suffix(PROPERTY)?.strip_suffix('/')?;
        if node.is_empty() || node.contains('/') {
            return None;
        }
        Some(node)
    }
}

/// Name/version pair advertised under `$fw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareIdentity {
    pub name: String,
    pub version: String,
}

/// Node description used in the advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: String,
    pub property_name: String,
}

/// A retained message of the advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

/// Device lifecycle values of `$state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Init,
    Ready,
    Disconnected,
    Lost,
}

impl DeviceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Init => "init",
            DeviceState::Ready => "ready",
            DeviceState::Disconnected => "disconnected",
            DeviceState::Lost => "lost",
        }
    }
}

impl HomieTopics {
    /// Everything a controller announces about itself, in publishing order:
    /// `$state=init` first, `$state=ready` last.
    pub fn advertisement(
        &self,
        device_name: &str,
        firmware: &FirmwareIdentity,
        nodes: &[NodeInfo],
    ) -> Vec<Message> {
        let msg = |topic: String, payload: &str| Message {
            topic,
            payload: payload.to_string(),
        };
        let node_ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

        let mut out = vec![
            msg(self.attribute("$state"), DeviceState::Init.as_str()),
            msg(self.attribute("$homie"), HOMIE_VERSION),
            msg(self.attribute("$name"), device_name),
            msg(self.attribute("$fw/name"), &firmware.name),
            msg(self.attribute("$fw/version"), &firmware.version),
            msg(self.attribute("$implementation"), "npk_pumps"),
            msg(self.attribute("$nodes"), &node_ids.join(",")),
        ];
        for node in nodes {
            let node_root = format!("{}/{}", self.device_root(), node.id);
            let prop = self.state_topic(&node.id);
            out.push(msg(format!("{node_root}/$name"), &node.id));
            out.push(msg(format!("{node_root}/$type"), NODE_TYPE));
            out.push(msg(format!("{node_root}/$properties"), PROPERTY));
            out.push(msg(format!("{prop}/$name"), &node.property_name));
            out.push(msg(format!("{prop}/$datatype"), "string"));
            out.push(msg(format!("{prop}/$settable"), "true"));
        }
        out.push(msg(self.attribute("$state"), DeviceState::Ready.as_str()));
        out
    }
}
