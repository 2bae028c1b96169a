//! Movement registry: `(body_part, movement_type)` → movement factory.
//!
//! The registry is filled once at startup and shared read-only afterwards.
//! [`MovementRegistry::resolve`] falls back to the static movement table for
//! pairs without a bespoke registration.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::movement::elbow::{ElbowExtension, ElbowFlexion};
use crate::movement::lower_back::{
    LowerBackExtension, LowerBackFlexion, LowerBackLateralFlexion, LowerBackRotation,
};
use crate::movement::shoulder::ShoulderFlexion;
use crate::movement::table::{movement_spec, movement_specs};
use crate::movement::{Movement, MovementFactory, MovementSettings, TableMovement};

/// Lookup of bespoke movement definitions.
#[derive(Clone, Default)]
pub struct MovementRegistry {
    entries: BTreeMap<String, BTreeMap<String, MovementFactory>>,
}

impl fmt::Debug for MovementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovementRegistry")
            .field("entries", &self.list(None))
            .finish()
    }
}

impl MovementRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every bespoke movement definition.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("lower_back", "flexion", |s| Box::new(LowerBackFlexion::new(*s)));
        registry.register("lower_back", "extension", |s| Box::new(LowerBackExtension::new(*s)));
        registry.register("lower_back", "lateral_flexion", |s| {
            Box::new(LowerBackLateralFlexion::new(*s))
        });
        registry.register("lower_back", "rotation", |s| Box::new(LowerBackRotation::new(*s)));
        registry.register("elbow", "flexion", |s| Box::new(ElbowFlexion::new(*s)));
        registry.register("elbow", "extension", |s| Box::new(ElbowExtension::new(*s)));
        registry.register("shoulder", "flexion", |s| Box::new(ShoulderFlexion::new(*s)));
        registry
    }

    /// Registers a factory. An existing registration for the pair is replaced.
    pub fn register(
        &mut self,
        body_part: impl Into<String>,
        movement_type: impl Into<String>,
        factory: MovementFactory,
    ) {
        let body_part = body_part.into();
        let movement_type = movement_type.into();
        if self.is_registered(&body_part, &movement_type) {
            tracing::debug!(%body_part, %movement_type, "replacing movement registration");
        }
        self.entries
            .entry(body_part)
            .or_default()
            .insert(movement_type, factory);
    }

    /// Returns `true` if a bespoke definition is registered for the pair.
    #[must_use]
    pub fn is_registered(&self, body_part: &str, movement_type: &str) -> bool {
        self.entries
            .get(body_part)
            .is_some_and(|movements| movements.contains_key(movement_type))
    }

    /// Returns the registered factory for the pair.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownBodyPart`] or [`CoreError::UnknownMovement`],
    /// listing the registered alternatives.
    pub fn get(&self, body_part: &str, movement_type: &str) -> CoreResult<MovementFactory> {
        let movements = self.entries.get(body_part).ok_or_else(|| {
            CoreError::unknown_body_part(body_part, self.entries.keys().cloned().collect())
        })?;
        movements.get(movement_type).copied().ok_or_else(|| {
            CoreError::unknown_movement(
                body_part,
                movement_type,
                movements.keys().cloned().collect(),
            )
        })
    }

    /// Registered movement types per body part, optionally restricted to one body part.
    #[must_use]
    pub fn list(&self, body_part: Option<&str>) -> BTreeMap<String, Vec<String>> {
        self.entries
            .iter()
            .filter(|(part, _)| body_part.map_or(true, |wanted| wanted == part.as_str()))
            .map(|(part, movements)| (part.clone(), movements.keys().cloned().collect()))
            .collect()
    }

    /// Every supported pair: registered definitions plus the movement table.
    #[must_use]
    pub fn supported(&self) -> BTreeMap<String, Vec<String>> {
        let mut all = self.list(None);
        for spec in movement_specs() {
            let movements = all.entry(spec.body_part.to_string()).or_default();
            if !movements.iter().any(|m| m == spec.movement_type) {
                movements.push(spec.movement_type.to_string());
            }
        }
        for movements in all.values_mut() {
            movements.sort();
        }
        all
    }

    /// Returns `true` if the pair is registered or present in the movement table.
    #[must_use]
    pub fn is_supported(&self, body_part: &str, movement_type: &str) -> bool {
        self.is_registered(body_part, movement_type)
            || movement_spec(body_part, movement_type).is_some()
    }

    /// Builds the movement for a pair: registry first, movement table second.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownBodyPart`] when neither source knows the body part,
    /// [`CoreError::UnknownMovement`] when the body part is known but the
    /// movement type is not. Alternatives span both sources.
    pub fn resolve(
        &self,
        body_part: &str,
        movement_type: &str,
        settings: &MovementSettings,
    ) -> CoreResult<Box<dyn Movement>> {
        if let Ok(factory) = self.get(body_part, movement_type) {
            return Ok(factory(settings));
        }
        if let Some(spec) = movement_spec(body_part, movement_type) {
            return Ok(Box::new(TableMovement::new(spec, *settings)));
        }
        let supported = self.supported();
        match supported.get(body_part) {
            None => Err(CoreError::unknown_body_part(
                body_part,
                supported.keys().cloned().collect(),
            )),
            Some(movements) => Err(CoreError::unknown_movement(
                body_part,
                movement_type,
                movements.clone(),
            )),
        }
    }
}
