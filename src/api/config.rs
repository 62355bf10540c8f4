use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{LayoutError, LayoutResult};
use crate::layout::{CirclePackConfig, FlowConfig, SunburstConfig, TreemapConfig};

pub const CHART_CONFIG_JSON_SCHEMA_V1: u32 = 1;

/// Geometry family used by a hierarchical chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierLayoutKind {
    /// Nested circles (flat bubble charts are the one-level case).
    #[default]
    Bubble,
    Treemap,
    Sunburst,
}

/// Serializable setup for a [`super::HierChart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierChartConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub kind: HierLayoutKind,
    #[serde(default)]
    pub circle: CirclePackConfig,
    #[serde(default)]
    pub treemap: TreemapConfig,
    #[serde(default)]
    pub sunburst: SunburstConfig,
    /// Drill path restored after every rebuild.
    #[serde(default)]
    pub drill_path: Option<String>,
}

impl HierChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport, kind: HierLayoutKind) -> Self {
        Self {
            viewport,
            kind,
            circle: CirclePackConfig::default(),
            treemap: TreemapConfig::default(),
            sunburst: SunburstConfig::default(),
            drill_path: None,
        }
    }

    #[must_use]
    pub fn with_circle(mut self, circle: CirclePackConfig) -> Self {
        self.circle = circle;
        self
    }

    #[must_use]
    pub fn with_treemap(mut self, treemap: TreemapConfig) -> Self {
        self.treemap = treemap;
        self
    }

    #[must_use]
    pub fn with_sunburst(mut self, sunburst: SunburstConfig) -> Self {
        self.sunburst = sunburst;
        self
    }

    #[must_use]
    pub fn with_drill_path(mut self, path: impl Into<String>) -> Self {
        self.drill_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> LayoutResult<()> {
        validate_viewport(self.viewport)?;
        if !self.circle.padding.is_finite() || self.circle.padding < 0.0 {
            return Err(LayoutError::InvalidData(
                "circle padding must be finite and >= 0".to_owned(),
            ));
        }
        self.treemap.validate()?;
        self.sunburst.validate()
    }

    pub fn to_json_pretty(&self) -> LayoutResult<String> {
        let payload = ConfigJsonContractV1 {
            schema_version: CHART_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            LayoutError::InvalidData(format!("failed to serialize chart config: {e}"))
        })
    }

    /// Accepts both the versioned contract and a bare config object.
    pub fn from_json_str(input: &str) -> LayoutResult<Self> {
        let config: Self = parse_versioned(input)?;
        config.validate()?;
        Ok(config)
    }
}

/// Serializable setup for a [`super::FlowChart`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowChartConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub flow: FlowConfig,
}

impl FlowChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            flow: FlowConfig::default(),
        }
    }

    #[must_use]
    pub fn with_flow(mut self, flow: FlowConfig) -> Self {
        self.flow = flow;
        self
    }

    pub fn validate(&self) -> LayoutResult<()> {
        validate_viewport(self.viewport)?;
        self.flow.validate()
    }

    pub fn to_json_pretty(&self) -> LayoutResult<String> {
        let payload = ConfigJsonContractV1 {
            schema_version: CHART_CONFIG_JSON_SCHEMA_V1,
            config: *self,
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            LayoutError::InvalidData(format!("failed to serialize flow config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> LayoutResult<Self> {
        let config: Self = parse_versioned(input)?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ConfigJsonContractV1<T> {
    schema_version: u32,
    config: T,
}

fn parse_versioned<T>(input: &str) -> LayoutResult<T>
where
    T: serde::de::DeserializeOwned,
{
    if let Ok(payload) = serde_json::from_str::<ConfigJsonContractV1<T>>(input) {
        if payload.schema_version != CHART_CONFIG_JSON_SCHEMA_V1 {
            return Err(LayoutError::InvalidData(format!(
                "unsupported config schema version: {}",
                payload.schema_version
            )));
        }
        return Ok(payload.config);
    }
    serde_json::from_str::<T>(input)
        .map_err(|e| LayoutError::InvalidData(format!("failed to parse config json: {e}")))
}

fn validate_viewport(viewport: Viewport) -> LayoutResult<()> {
    if !viewport.is_valid() {
        return Err(LayoutError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    Ok(())
}
