//! Database-specific helpers, indexers and factory methods.

use wirefind_core::{
    Capability, Primitive, Serializer, SerializerKind, TYPE_INT32, TYPE_OBJECT, TypeShape,
    WireType, standard_serializer,
};

use crate::Result;
use crate::expr::{ConstValue, ExprKind, Owner};

use super::{CallSite, Deducer, Lambda};

impl<'a> Deducer<'a> {
    fn constant_arg(&self, call: &CallSite<'_>, index: usize) -> Option<&'a ConstValue> {
        match self.kind(*call.args.get(index)?) {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Serializer passed as a constant argument; `None` for a null constant.
    fn serializer_arg(
        &self,
        call: &CallSite<'_>,
        index: usize,
        name: &str,
    ) -> Result<Option<Serializer>> {
        match self.constant_arg(call, index) {
            Some(ConstValue::Serializer(serializer)) => Ok(serializer.clone()),
            Some(ConstValue::Null) => Ok(None),
            _ => Err(self.unsupported(call.node, format!("{name} argument must be a constant"))),
        }
    }
}

fn unknown(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    cx.deduce_unknown_method(call)
}

/// `source.AppendStage(stage, resultSerializer)`.
pub(super) fn append_stage(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::MongoQueryable || call.arity() != 3 {
        return unknown(cx, call);
    }
    if cx.is_known(call.node) {
        return Ok(());
    }
    let Some(ConstValue::Stage(stage)) = cx.constant_arg(call, 1) else {
        return Err(cx.unsupported(call.node, "stage argument must be a constant"));
    };

    let mut result = cx.serializer_arg(call, 2, "resultSerializer")?;
    if result.is_none()
        && let Some(input) = cx.item_of(call.args[0])?
    {
        if input.is_unknowable() {
            return cx.add_unknowable(call.node);
        }
        let output = stage
            .output_serializer(&input)
            .map_err(|err| cx.serializer_error(call.node, err))?;
        result = Some(output);
    }

    let Some(result) = result else {
        return Ok(());
    };
    let serializer = cx.collection_of(call.node, result)?;
    cx.add(call.node, serializer)
}

/// `source.As(resultSerializer)`.
pub(super) fn as_serializer(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::MongoQueryable || call.arity() != 2 {
        return unknown(cx, call);
    }
    if cx.is_known(call.node) {
        return Ok(());
    }
    let item = match cx.serializer_arg(call, 1, "resultSerializer")? {
        Some(item) => item,
        None => {
            let Some(item_ty) = call
                .method
                .generic_arg(1)
                .or_else(|| cx.types.item_type(cx.ty(call.node)))
            else {
                return unknown(cx, call);
            };
            cx.lookup(call.node, item_ty)?
        }
    };
    let serializer = cx.collection_of(call.node, item)?;
    cx.add(call.node, serializer)
}

/// `Mql.Constant(value, representation)` and `Mql.Constant(value, serializer)`.
pub(super) fn constant(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Mql || call.arity() != 2 {
        return unknown(cx, call);
    }
    let value = call.args[0];
    if cx.is_known(call.node) && cx.is_known(value) {
        return Ok(());
    }

    let serializer = match cx.constant_arg(call, 1) {
        Some(ConstValue::Representation(representation)) => cx
            .lookup(value, cx.ty(value))?
            .with_representation(*representation)
            .map_err(|err| cx.serializer_error(call.node, err))?,
        Some(ConstValue::Serializer(Some(serializer))) => serializer.clone(),
        Some(ConstValue::Serializer(None) | ConstValue::Null) => {
            return Err(cx.unsupported(call.node, "serializer argument is null"));
        }
        _ => {
            return Err(cx.unsupported(
                call.node,
                "representation or serializer argument must be a constant",
            ));
        }
    };
    cx.add_if_unknown(value, serializer.clone())?;
    cx.add_if_unknown(call.node, serializer)
}

/// `dictionary.ContainsKey(key)`.
pub(super) fn contains_key(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    let (Some(dictionary), [key]) = (call.object, call.args) else {
        return unknown(cx, call);
    };
    if !cx.is_known(*key)
        && let Some(serializer) = cx.known(dictionary)
        && serializer.has(Capability::Key)
    {
        let key_serializer = serializer
            .key_serializer()
            .map_err(|err| cx.serializer_error(dictionary, err))?;
        cx.add(*key, key_serializer)?;
    }
    cx.returns_standard(call.node)
}

/// `dictionary.ContainsValue(value)`.
pub(super) fn contains_value(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    let (Some(dictionary), [value]) = (call.object, call.args) else {
        return unknown(cx, call);
    };
    if !cx.is_known(*value)
        && let Some(serializer) = cx.known(dictionary)
        && serializer.has(Capability::Value)
    {
        let value_serializer = serializer
            .value_serializer()
            .map_err(|err| cx.serializer_error(dictionary, err))?;
        cx.add(*value, value_serializer)?;
    }
    cx.returns_standard(call.node)
}

/// `Mql.Convert<TFrom, TTo>(value, options)`: the server-side conversion
/// produces the standard encoding of `TTo`.
pub(super) fn convert(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Mql || call.arity() != 2 {
        return unknown(cx, call);
    }
    if cx.is_known(call.node) {
        return Ok(());
    }

    let types = cx.types;
    let to = call.method.generic_arg(1).unwrap_or(cx.ty(call.node));
    let value_ty = types.strip_nullable(to);
    let value = match types.shape(value_ty) {
        TypeShape::Primitive(Primitive::Char) => Some(Serializer::primitive(value_ty, WireType::String)),
        TypeShape::Primitive(Primitive::TimeSpan) => None,
        TypeShape::Primitive(_) => standard_serializer(types, value_ty),
        TypeShape::Array(item) if types.primitive(*item) == Some(Primitive::Byte) => {
            Some(Serializer::primitive(value_ty, WireType::Binary))
        }
        _ => None,
    };
    let Some(value) = value else {
        return Err(cx.unsupported(
            call.node,
            format!("{} is not a valid TTo for Convert", types.display(to)),
        ));
    };

    let serializer = if types.is_nullable(to) {
        Serializer::nullable(to, value)
    } else {
        value
    };
    cx.add(call.node, serializer)
}

/// `KeyValuePair.Create`, `Tuple.Create`, `ValueTuple.Create`.
pub(super) fn create(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    match call.owner() {
        Owner::KeyValuePair if call.arity() == 2 => create_key_value_pair(cx, call),
        Owner::Tuple | Owner::ValueTuple if (1..=8).contains(&call.arity()) => {
            create_tuple(cx, call)
        }
        _ => unknown(cx, call),
    }
}

fn create_key_value_pair(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    let (key, value) = (call.args[0], call.args[1]);
    if let Some(pair) = cx.known(call.node)
        && !pair.is_sentinel()
    {
        let fail = |err| cx.serializer_error(call.node, err);
        let key_serializer = pair.key_serializer().map_err(fail)?;
        let value_serializer = pair.value_serializer().map_err(fail)?;
        cx.add_if_unknown(key, key_serializer)?;
        cx.add_if_unknown(value, value_serializer)?;
    }

    if cx.is_known(call.node) {
        return Ok(());
    }
    let (Some(key), Some(value)) = (cx.known(key), cx.known(value)) else {
        return Ok(());
    };
    if key.is_unknowable() || value.is_unknowable() {
        return cx.add_unknowable(call.node);
    }
    let pair = Serializer::key_value_pair(cx.ty(call.node), key, value);
    cx.add(call.node, pair)
}

fn create_tuple(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if let Some(tuple) = cx.known(call.node)
        && !tuple.is_sentinel()
    {
        for (index, &arg) in call.args.iter().enumerate() {
            if cx.is_known(arg) {
                continue;
            }
            let item = tuple
                .tuple_item_serializer(index + 1)
                .map_err(|err| cx.serializer_error(call.node, err))?;
            cx.add(arg, item)?;
        }
    }

    if cx.is_known(call.node) {
        return Ok(());
    }
    let known: Vec<Serializer> = call.args.iter().filter_map(|&arg| cx.known(arg)).collect();
    if known.len() != call.arity() {
        return Ok(());
    }
    if known.iter().any(Serializer::is_unknowable) {
        return cx.add_unknowable(call.node);
    }

    let node_ty = cx.ty(call.node);
    let mut items = known;
    if items.len() == 8 {
        let rest_ty = match cx.types.shape(node_ty) {
            TypeShape::Tuple { items, .. } if items.len() == 8 => items[7],
            _ => {
                return Err(cx.unsupported(
                    call.node,
                    "an 8-item tuple must nest its last item in a remainder tuple",
                ));
            }
        };
        if let Some(last) = items.pop() {
            items.push(Serializer::tuple(rest_ty, vec![last]));
        }
    }
    cx.add(call.node, Serializer::tuple(node_ty, items))
}

/// `MongoQueryable.Documents(database, documents[, documentSerializer])`.
pub(super) fn documents(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::MongoQueryable || !(2..=3).contains(&call.arity()) {
        return unknown(cx, call);
    }
    if cx.is_known(call.node) {
        return Ok(());
    }

    let explicit = if call.arity() == 3 {
        cx.serializer_arg(call, 2, "documentSerializer")?
    } else {
        None
    };
    let document = match explicit {
        Some(document) => document,
        None => {
            let Some(document_ty) = call
                .method
                .generic_arg(0)
                .or_else(|| cx.types.item_type(cx.ty(call.args[1])))
            else {
                return unknown(cx, call);
            };
            cx.lookup(call.node, document_ty)?
        }
    };

    let documents = call.args[1];
    if !cx.is_known(documents) && cx.types.item_type(cx.ty(documents)).is_some() {
        let serializer = cx.collection_of(documents, document.clone())?;
        cx.add(documents, serializer)?;
    }
    let serializer = cx.collection_of(call.node, document)?;
    cx.add(call.node, serializer)
}

/// `Mql.IsMissing`, `Mql.IsNullOrMissing`.
pub(super) fn field_predicate(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Mql || call.arity() != 1 {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

/// `Mql.Field(document, name, serializer)`.
pub(super) fn field(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Mql || call.arity() != 3 {
        return unknown(cx, call);
    }
    if cx.is_known(call.node) {
        return Ok(());
    }
    let Some(serializer) = cx.serializer_arg(call, 2, "fieldSerializer")? else {
        return Err(cx.unsupported(call.node, "fieldSerializer is null"));
    };
    cx.add(call.node, serializer)
}

/// `s[i]` on strings.
pub(super) fn get_chars(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::String || call.object.is_none() || call.arity() != 1 {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

/// Indexers: wire values, lists and dictionaries.
pub(super) fn get_item(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if cx.is_known(call.node) {
        return Ok(());
    }
    let (Some(container), [index]) = (call.object, call.args) else {
        return unknown(cx, call);
    };

    let types = cx.types;
    if matches!(
        types.shape(cx.ty(container)),
        TypeShape::WireValue | TypeShape::Document
    ) {
        return cx.returns_standard(call.node);
    }

    let Some(serializer) = cx.known(container) else {
        return Ok(());
    };
    if serializer.is_unknowable() {
        return cx.add_unknowable(call.node);
    }
    let node_ty = cx.ty(call.node);
    let index_ty = cx.ty(*index);

    if serializer.has(Capability::Items) && index_ty == TYPE_INT32 {
        let item = serializer
            .item_serializer()
            .map_err(|err| cx.serializer_error(container, err))?;
        if item.value_type() == node_ty {
            return cx.add(call.node, item);
        }
    } else if serializer.has(Capability::Key) && serializer.has(Capability::Value) {
        let fail = |err| cx.serializer_error(container, err);
        let key = serializer.key_serializer().map_err(fail)?;
        let value = serializer.value_serializer().map_err(fail)?;
        if key.value_type() == index_ty && value.value_type() == node_ty {
            return cx.add(call.node, value);
        }
    }
    Ok(())
}

/// `filter.Inject()`.
pub(super) fn inject(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::LinqExtensions {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

/// Where the foreign documents of a `Lookup` come from.
enum Foreign<'t> {
    Collection(Serializer),
    /// `local => documents`, evaluated per local document.
    Documents(Lambda<'t>),
}

/// `source.Lookup(..)`: every overload pairs each local document with the
/// matching foreign documents, optionally reshaped by a pipeline.
pub(super) fn lookup(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::MongoQueryable || !(3..=5).contains(&call.arity()) {
        return unknown(cx, call);
    }
    let source = call.args[0];
    let foreign = match cx.constant_arg(call, 1) {
        Some(ConstValue::Collection { document, .. }) => Foreign::Collection(document.clone()),
        _ => match cx.lambda_arg(call, 1, 1) {
            Some(documents) => Foreign::Documents(documents),
            None => return unknown(cx, call),
        },
    };

    let foreign_document = match &foreign {
        Foreign::Collection(document) => Some(document.clone()),
        Foreign::Documents(documents) => {
            cx.deduce_item_and_collection(documents.params[0], source)?;
            cx.item_of(documents.body)?
        }
    };

    if call.arity() >= 4 {
        let (Some(local_field), Some(foreign_field)) =
            (cx.lambda_arg(call, 2, 1), cx.lambda_arg(call, 3, 1))
        else {
            return unknown(cx, call);
        };
        cx.deduce_item_and_collection(local_field.params[0], source)?;
        match &foreign {
            Foreign::Collection(document) => {
                cx.add_if_unknown(foreign_field.params[0], document.clone())?;
            }
            Foreign::Documents(documents) => {
                cx.deduce_item_and_collection(foreign_field.params[0], documents.body)?;
            }
        }
    }

    let pipeline_index = match call.arity() {
        3 => Some(2),
        5 => Some(4),
        _ => None,
    };
    let results = match pipeline_index {
        Some(index) => {
            let Some(pipeline) = cx.lambda_arg(call, index, 2) else {
                return unknown(cx, call);
            };
            let (local, foreign_queryable) = (pipeline.params[0], pipeline.params[1]);
            cx.deduce_item_and_collection(local, source)?;
            match &foreign {
                Foreign::Collection(document) => {
                    if !cx.is_known(foreign_queryable) {
                        let serializer = cx.collection_of(foreign_queryable, document.clone())?;
                        cx.add(foreign_queryable, serializer)?;
                    }
                }
                Foreign::Documents(documents) => {
                    cx.deduce_collection_and_collection(foreign_queryable, documents.body)?;
                }
            }
            cx.item_of(pipeline.body)?
        }
        None => foreign_document,
    };

    if cx.is_known(call.node) {
        return Ok(());
    }
    let (Some(local), Some(results)) = (cx.item_of(source)?, results) else {
        return Ok(());
    };
    if local.is_unknowable() || results.is_unknowable() {
        return cx.add_unknowable(call.node);
    }
    let row_ty = cx.types.item_type(cx.ty(call.node)).unwrap_or(TYPE_OBJECT);
    let row = Serializer::new(
        row_ty,
        SerializerKind::LookupResult {
            local,
            foreign: results,
        },
    );
    let serializer = cx.collection_of(call.node, row)?;
    cx.add(call.node, serializer)
}
