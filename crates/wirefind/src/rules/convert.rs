//! Serializers for type conversions.

use wirefind_core::{
    Serializer, SerializerError, SerializerKind, TYPE_STRING, TYPE_WIRE_VALUE, TypeId,
    enum_over_underlying, standard_serializer,
};

use crate::Result;
use crate::expr::ExprId;

use super::Deducer;

impl Deducer<'_> {
    pub(crate) fn deduce_convert(&mut self, node: ExprId, operand: ExprId) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }
        let Some(source) = self.known(operand) else {
            return Ok(());
        };
        if source.is_unknowable() {
            return self.add_unknowable(node);
        }

        match self.derive_conversion(self.ty(operand), self.ty(node), &source) {
            Ok(Some(serializer)) => self.add(node, serializer),
            Ok(None) => Ok(()),
            Err(err) => Err(self.serializer_error(node, err)),
        }
    }

    /// Serializer for the result of converting a `source`-typed value,
    /// encoded by `serializer`, to `target`. `None` when no rule applies.
    pub(crate) fn derive_conversion(
        &self,
        source: TypeId,
        target: TypeId,
        serializer: &Serializer,
    ) -> Result<Option<Serializer>, SerializerError> {
        let types = self.types;

        if source == target {
            return Ok(Some(serializer.clone()));
        }

        if target == TYPE_WIRE_VALUE {
            return Ok(Some(Serializer::new(
                target,
                SerializerKind::ToWireValue(serializer.clone()),
            )));
        }

        if let Some(source_inner) = types.nullable_underlying(source) {
            let inner = serializer.nullable_value_serializer()?;
            let target_inner = types.nullable_underlying(target);
            let converted =
                self.derive_conversion(source_inner, target_inner.unwrap_or(target), &inner)?;
            return Ok(match target_inner {
                Some(_) => converted.map(|converted| Serializer::nullable(target, converted)),
                None => converted,
            });
        }

        if let Some(target_inner) = types.nullable_underlying(target) {
            let converted = self.derive_conversion(source, target_inner, serializer)?;
            return Ok(converted.map(|converted| Serializer::nullable(target, converted)));
        }

        if source == TYPE_WIRE_VALUE {
            if target == TYPE_STRING {
                return Ok(standard_serializer(types, TYPE_STRING));
            }
            return Err(self.unsupported_conversion(source, target));
        }

        if let Some(underlying) = types.enum_underlying(source)
            && types.is_numeric(target)
        {
            let raw = Serializer::new(
                underlying,
                SerializerKind::EnumUnderlying(serializer.clone()),
            );
            if underlying == target {
                return Ok(Some(raw));
            }
            return Ok(Some(Serializer::new(
                target,
                SerializerKind::NumericConversion(raw),
            )));
        }

        if types.is_enum(target) && types.is_numeric(source) {
            return Ok(Some(enum_over_underlying(target, serializer)));
        }

        if types.is_enum(source) && types.is_enum(target) {
            return self.registry.lookup(target).map(Some);
        }

        if types.is_numeric(source) && types.is_numeric(target) {
            return Ok(Some(Serializer::new(
                target,
                SerializerKind::NumericConversion(serializer.clone()),
            )));
        }

        if types.is_assignable_from(source, target) {
            return serializer
                .derived_type_serializer(types, self.registry, target)
                .map(Some);
        }

        if types.is_assignable_from(target, source) {
            return serializer.base_type_serializer(types, target).map(Some);
        }

        Ok(None)
    }

    fn unsupported_conversion(&self, source: TypeId, target: TypeId) -> SerializerError {
        SerializerError::UnsupportedConversion {
            from: self.types.display(source).to_string(),
            to: self.types.display(target).to_string(),
        }
    }
}
