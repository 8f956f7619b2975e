//! Sequence operators (`Where`, `Select`, `GroupBy`, ...).

use wirefind_core::{Capability, Serializer, TYPE_OBJECT};

use crate::Result;
use crate::expr::{ExprId, Owner};

use super::{CallSite, Deducer, Lambda};

const LINQ: &[Owner] = &[Owner::Enumerable, Owner::Queryable];

const LINQ_OR_MONGO: &[Owner] = &[
    Owner::Enumerable,
    Owner::Queryable,
    Owner::MongoEnumerable,
    Owner::MongoQueryable,
];

impl<'a> Deducer<'a> {
    /// Lambda at `index` whose first parameter ranges over the items of
    /// `source`. A second parameter, when present, is the item index.
    fn item_lambda(
        &mut self,
        call: &CallSite<'_>,
        index: usize,
        source: ExprId,
    ) -> Result<Option<Lambda<'a>>> {
        let lambda = match self.lambda_arg(call, index, 1) {
            Some(lambda) => lambda,
            None => match self.lambda_arg(call, index, 2) {
                Some(lambda) => {
                    self.returns_standard(lambda.params[1])?;
                    lambda
                }
                None => return Ok(None),
            },
        };
        self.deduce_item_and_collection(lambda.params[0], source)?;
        Ok(Some(lambda))
    }

    /// `param` is a sequence of the items of `source`.
    fn deduce_sequence_param(&mut self, param: ExprId, source: ExprId) -> Result<()> {
        if self.is_known(param) {
            return Ok(());
        }
        let Some(item) = self.item_of(source)? else {
            return Ok(());
        };
        let serializer = self.collection_of(param, item)?;
        self.add(param, serializer)
    }
}

fn unknown(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    cx.deduce_unknown_method(call)
}

pub(super) fn aggregate(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    let Some(&source) = call.args.first() else {
        return unknown(cx, call);
    };
    if !call.is_owned_by(LINQ) {
        return unknown(cx, call);
    }
    match call.arity() {
        2 => {
            let Some(func) = cx.lambda_arg(call, 1, 2) else {
                return unknown(cx, call);
            };
            cx.deduce_item_and_collection(func.params[0], source)?;
            cx.deduce_item_and_collection(func.params[1], source)?;
            cx.deduce_same(func.body, func.params[0])?;
            cx.deduce_same(call.node, func.body)
        }
        3 | 4 => {
            let seed = call.args[1];
            let Some(func) = cx.lambda_arg(call, 2, 2) else {
                return unknown(cx, call);
            };
            cx.deduce_same(func.params[0], seed)?;
            cx.deduce_item_and_collection(func.params[1], source)?;
            cx.deduce_same(func.body, func.params[0])?;
            cx.deduce_same(seed, func.body)?;
            if call.arity() == 3 {
                return cx.deduce_same(call.node, func.body);
            }
            let Some(result) = cx.lambda_arg(call, 3, 1) else {
                return unknown(cx, call);
            };
            cx.deduce_same(result.params[0], func.body)?;
            cx.deduce_same(call.node, result.body)
        }
        _ => unknown(cx, call),
    }
}

pub(super) fn all(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || call.arity() != 2 {
        return unknown(cx, call);
    }
    if cx.item_lambda(call, 1, call.args[0])?.is_none() {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

pub(super) fn any(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) {
        return unknown(cx, call);
    }
    match call.arity() {
        1 => cx.returns_standard(call.node),
        2 => {
            if cx.item_lambda(call, 1, call.args[0])?.is_none() {
                return unknown(cx, call);
            }
            cx.returns_standard(call.node)
        }
        _ => unknown(cx, call),
    }
}

pub(super) fn append(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || call.arity() != 2 {
        return unknown(cx, call);
    }
    let (source, element) = (call.args[0], call.args[1]);
    cx.deduce_collection_and_item(source, element)?;
    cx.deduce_collection_and_collection(call.node, source)
}

pub(super) fn as_queryable(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Queryable || call.arity() != 1 {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_collection(call.node, call.args[0])
}

/// `Average`, `Median`, `Percentile`: numeric results with standard
/// serializers.
pub(super) fn average(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(&[Owner::Enumerable, Owner::Queryable, Owner::MongoEnumerable])
        || call.arity() == 0
        || call.arity() > 3
    {
        return unknown(cx, call);
    }
    if cx.is_lambda_arg(call, 1) && cx.item_lambda(call, 1, call.args[0])?.is_none() {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

/// Accumulators that pick items by position or order (`Top`, `FirstN`,
/// `MaxN`). Sort specifications are configuration.
pub(super) fn pick(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::MongoEnumerable || call.arity() < 2 {
        return unknown(cx, call);
    }
    let source = call.args[0];
    let Some(selector_index) = (1..call.arity()).find(|&i| cx.is_lambda_arg(call, i)) else {
        return unknown(cx, call);
    };
    for &sort_by in &call.args[1..selector_index] {
        cx.add_ignore_subtree(sort_by)?;
    }
    let Some(selector) = cx.item_lambda(call, selector_index, source)? else {
        return unknown(cx, call);
    };

    if call.method.name.ends_with('N') {
        cx.deduce_collection_and_item(call.node, selector.body)
    } else {
        cx.deduce_same(call.node, selector.body)
    }
}

pub(super) fn concat(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() == Owner::String {
        return cx.returns_standard(call.node);
    }
    if !call.is_owned_by(LINQ) || call.arity() != 2 {
        return unknown(cx, call);
    }
    let (first, second) = (call.args[0], call.args[1]);
    cx.deduce_collection_and_collection(second, first)?;
    cx.deduce_collection_and_collection(call.node, first)
}

pub(super) fn contains(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() == Owner::String {
        return cx.returns_standard(call.node);
    }
    if call.is_owned_by(LINQ) && call.arity() == 2 {
        cx.deduce_collection_and_item(call.args[0], call.args[1])?;
        return cx.returns_standard(call.node);
    }
    if let Some(object) = call.object
        && call.arity() == 1
        && cx.types.item_type(cx.ty(object)).is_some()
    {
        cx.deduce_collection_and_item(object, call.args[0])?;
        return cx.returns_standard(call.node);
    }
    unknown(cx, call)
}

pub(super) fn count(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) {
        return unknown(cx, call);
    }
    match call.arity() {
        1 => cx.returns_standard(call.node),
        2 => {
            if cx.item_lambda(call, 1, call.args[0])?.is_none() {
                return unknown(cx, call);
            }
            cx.returns_standard(call.node)
        }
        _ => unknown(cx, call),
    }
}

pub(super) fn default_if_empty(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || !(1..=2).contains(&call.arity()) {
        return unknown(cx, call);
    }
    let source = call.args[0];
    if let Some(&default) = call.args.get(1) {
        cx.deduce_collection_and_item(source, default)?;
    }
    cx.deduce_collection_and_collection(call.node, source)
}

/// Operators whose result holds items of the source (`Distinct`, `Skip`,
/// `Take`, `Reverse`).
pub(super) fn same_sequence(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ_OR_MONGO) || !call.is_static() || !(1..=2).contains(&call.arity()) {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_collection(call.node, call.args[0])
}

pub(super) fn element_at(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || call.arity() != 2 {
        return unknown(cx, call);
    }
    cx.deduce_item_and_collection(call.node, call.args[0])
}

/// `Except`, `Intersect`, `Union`.
pub(super) fn set_operation(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || call.arity() != 2 {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_collection(call.node, call.args[0])
}

/// `Array.Exists(array, predicate)`, `list.Exists(predicate)` and
/// `Mql.Exists(field)`.
pub(super) fn exists(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    match (call.owner(), call.object, call.arity()) {
        (Owner::Mql, None, 1) => cx.returns_standard(call.node),
        (Owner::Array, None, 2) => {
            if cx.item_lambda(call, 1, call.args[0])?.is_none() {
                return unknown(cx, call);
            }
            cx.returns_standard(call.node)
        }
        (_, Some(object), 1) => {
            if cx.item_lambda(call, 0, object)?.is_none() {
                return unknown(cx, call);
            }
            cx.returns_standard(call.node)
        }
        _ => unknown(cx, call),
    }
}

/// `First`, `Last`, `Single` and their `OrDefault` forms, with optional
/// predicate and default value.
pub(super) fn first(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ_OR_MONGO) || !(1..=3).contains(&call.arity()) {
        return unknown(cx, call);
    }
    let source = call.args[0];
    let mut default = None;
    match call.arity() {
        2 if cx.is_lambda_arg(call, 1) => {
            if cx.item_lambda(call, 1, source)?.is_none() {
                return unknown(cx, call);
            }
        }
        2 => default = Some(call.args[1]),
        3 => {
            if cx.item_lambda(call, 1, source)?.is_none() {
                return unknown(cx, call);
            }
            default = Some(call.args[2]);
        }
        _ => {}
    }

    cx.deduce_item_and_collection(call.node, source)?;
    if let Some(default) = default {
        cx.deduce_same(call.node, default)?;
    }
    Ok(())
}

pub(super) fn group_by(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || !(2..=4).contains(&call.arity()) {
        return unknown(cx, call);
    }
    let source = call.args[0];
    let Some(key) = cx.item_lambda(call, 1, source)? else {
        return unknown(cx, call);
    };

    match call.arity() {
        2 => {
            let element = cx.item_of(source)?;
            deduce_groupings(cx, call.node, key.body, element)
        }
        3 => {
            if let Some(element) = cx.lambda_arg(call, 2, 1) {
                cx.deduce_item_and_collection(element.params[0], source)?;
                let element = cx.known(element.body);
                return deduce_groupings(cx, call.node, key.body, element);
            }
            let Some(result) = cx.lambda_arg(call, 2, 2) else {
                return unknown(cx, call);
            };
            cx.deduce_same(result.params[0], key.body)?;
            cx.deduce_sequence_param(result.params[1], source)?;
            cx.deduce_collection_and_item(call.node, result.body)
        }
        _ => {
            let (Some(element), Some(result)) = (cx.lambda_arg(call, 2, 1), cx.lambda_arg(call, 3, 2))
            else {
                return unknown(cx, call);
            };
            cx.deduce_item_and_collection(element.params[0], source)?;
            cx.deduce_same(result.params[0], key.body)?;
            if !cx.is_known(result.params[1])
                && let Some(item) = cx.known(element.body)
            {
                let elements = cx.collection_of(result.params[1], item)?;
                cx.add(result.params[1], elements)?;
            }
            cx.deduce_collection_and_item(call.node, result.body)
        }
    }
}

/// Result of `GroupBy` without a result selector: a sequence of groupings.
fn deduce_groupings(
    cx: &mut Deducer<'_>,
    node: ExprId,
    key: ExprId,
    element: Option<Serializer>,
) -> Result<()> {
    if cx.is_known(node) {
        return Ok(());
    }
    let (Some(key), Some(element)) = (cx.known(key), element) else {
        return Ok(());
    };
    if key.is_unknowable() || element.is_unknowable() {
        return cx.add_unknowable(node);
    }
    let grouping_ty = cx.types.item_type(cx.ty(node)).unwrap_or(TYPE_OBJECT);
    let grouping = Serializer::grouping(grouping_ty, key, element);
    let serializer = cx.collection_of(node, grouping)?;
    cx.add(node, serializer)
}

pub(super) fn group_join(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    deduce_join(cx, call, true)
}

pub(super) fn join(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    deduce_join(cx, call, false)
}

fn deduce_join(cx: &mut Deducer<'_>, call: &CallSite<'_>, grouped: bool) -> Result<()> {
    if !call.is_owned_by(LINQ) || call.arity() != 5 {
        return unknown(cx, call);
    }
    let (outer, inner) = (call.args[0], call.args[1]);
    let (Some(outer_key), Some(inner_key), Some(result)) = (
        cx.lambda_arg(call, 2, 1),
        cx.lambda_arg(call, 3, 1),
        cx.lambda_arg(call, 4, 2),
    ) else {
        return unknown(cx, call);
    };

    cx.deduce_item_and_collection(outer_key.params[0], outer)?;
    cx.deduce_item_and_collection(inner_key.params[0], inner)?;
    cx.deduce_same(outer_key.body, inner_key.body)?;
    cx.deduce_item_and_collection(result.params[0], outer)?;
    if grouped {
        cx.deduce_sequence_param(result.params[1], inner)?;
    } else {
        cx.deduce_item_and_collection(result.params[1], inner)?;
    }
    cx.deduce_collection_and_item(call.node, result.body)
}

/// `IsSubsetOf`, `SetEquals`.
pub(super) fn set_predicate(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    let Some(object) = call.object else {
        return unknown(cx, call);
    };
    if call.arity() != 1 {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_collection(call.args[0], object)?;
    cx.returns_standard(call.node)
}

/// Array-filter helpers of update definitions; each yields one item.
pub(super) fn all_elements(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::MongoEnumerable || call.arity() == 0 {
        return unknown(cx, call);
    }
    cx.deduce_item_and_collection(call.node, call.args[0])
}

pub(super) fn max(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.is_owned_by(&[Owner::Math, Owner::MongoMath]) && call.arity() == 2 {
        let (a, b) = (call.args[0], call.args[1]);
        cx.deduce_same(a, b)?;
        cx.deduce_same(call.node, a)?;
        return cx.deduce_same(call.node, b);
    }
    let Some(&source) = call.args.first() else {
        return unknown(cx, call);
    };
    if !call.is_owned_by(LINQ) {
        return unknown(cx, call);
    }
    match call.arity() {
        1 => cx.deduce_item_and_collection(call.node, source),
        2 => {
            let Some(selector) = cx.item_lambda(call, 1, source)? else {
                return unknown(cx, call);
            };
            cx.deduce_same(call.node, selector.body)
        }
        _ => unknown(cx, call),
    }
}

pub(super) fn of_type(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || call.arity() != 1 {
        return unknown(cx, call);
    }
    if cx.is_known(call.node) {
        return Ok(());
    }
    let Some(item) = cx.item_of(call.args[0])? else {
        return Ok(());
    };
    if item.is_unknowable() {
        return cx.add_unknowable(call.node);
    }

    let types = cx.types;
    let Some(derived) = call
        .method
        .generic_arg(0)
        .or_else(|| types.item_type(cx.ty(call.node)))
    else {
        return unknown(cx, call);
    };
    let derived = item
        .derived_type_serializer(types, cx.registry, derived)
        .map_err(|err| cx.serializer_error(call.node, err))?;
    let serializer = cx.collection_of(call.node, derived)?;
    cx.add(call.node, serializer)
}

/// `OrderBy`, `ThenBy` and descending forms.
pub(super) fn order_by(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || !(2..=3).contains(&call.arity()) {
        return unknown(cx, call);
    }
    let source = call.args[0];
    if cx.item_lambda(call, 1, source)?.is_none() {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_collection(call.node, source)
}

pub(super) fn range(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Enumerable || call.arity() != 2 {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_item(call.node, call.args[0])
}

pub(super) fn repeat(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Enumerable || call.arity() != 2 {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_item(call.node, call.args[0])
}

pub(super) fn select(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || call.arity() != 2 {
        return unknown(cx, call);
    }
    let Some(selector) = cx.item_lambda(call, 1, call.args[0])? else {
        return unknown(cx, call);
    };
    cx.deduce_collection_and_item(call.node, selector.body)
}

pub(super) fn select_many(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    let Some(&source) = call.args.first() else {
        return unknown(cx, call);
    };
    if !call.is_owned_by(LINQ) {
        return unknown(cx, call);
    }
    match call.arity() {
        2 => {
            let Some(selector) = cx.item_lambda(call, 1, source)? else {
                return unknown(cx, call);
            };
            cx.deduce_collection_and_collection(call.node, selector.body)
        }
        3 => {
            let (Some(collection), Some(result)) =
                (cx.item_lambda(call, 1, source)?, cx.lambda_arg(call, 2, 2))
            else {
                return unknown(cx, call);
            };
            cx.deduce_item_and_collection(result.params[0], source)?;
            cx.deduce_item_and_collection(result.params[1], collection.body)?;
            cx.deduce_collection_and_item(call.node, result.body)
        }
        _ => unknown(cx, call),
    }
}

pub(super) fn sequence_equal(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) || call.arity() != 2 {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_collection(call.args[1], call.args[0])?;
    cx.returns_standard(call.node)
}

/// `partition.Shift(selector, documentNumber[, defaultValue])`.
pub(super) fn shift(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if call.owner() != Owner::Window || !(3..=4).contains(&call.arity()) {
        return unknown(cx, call);
    }
    let partition = call.args[0];
    let Some(selector) = cx.lambda_arg(call, 1, 1) else {
        return unknown(cx, call);
    };
    if cx
        .known(partition)
        .is_some_and(|serializer| serializer.has(Capability::Items))
    {
        cx.deduce_item_and_collection(selector.params[0], partition)?;
    }
    cx.deduce_same(call.node, selector.body)?;
    if let Some(&default) = call.args.get(3) {
        cx.deduce_same(default, call.node)?;
    }
    Ok(())
}

/// `Where`, `SkipWhile`, `TakeWhile`.
pub(super) fn filter(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ_OR_MONGO) || !(2..=3).contains(&call.arity()) {
        return unknown(cx, call);
    }
    let source = call.args[0];
    if cx.item_lambda(call, 1, source)?.is_none() {
        return unknown(cx, call);
    }
    cx.deduce_collection_and_collection(call.node, source)
}

/// `Sum` and the standard deviations: numeric results with standard
/// serializers.
pub(super) fn sum(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(&[Owner::Enumerable, Owner::Queryable, Owner::MongoEnumerable])
        || !(1..=2).contains(&call.arity())
    {
        return unknown(cx, call);
    }
    if call.arity() == 2 && cx.item_lambda(call, 1, call.args[0])?.is_none() {
        return unknown(cx, call);
    }
    cx.returns_standard(call.node)
}

/// `ToArray`, `ToList`, static or instance.
pub(super) fn to_collection(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    let source = match (call.object, call.arity()) {
        (Some(object), 0) => object,
        (None, 1) if call.is_owned_by(LINQ) => call.args[0],
        _ => return unknown(cx, call),
    };
    cx.deduce_collection_and_collection(call.node, source)
}

pub(super) fn zip(cx: &mut Deducer<'_>, call: &CallSite<'_>) -> Result<()> {
    if !call.is_owned_by(LINQ) {
        return unknown(cx, call);
    }
    let (first, second) = match call.args {
        [first, second, ..] => (*first, *second),
        _ => return unknown(cx, call),
    };
    match call.arity() {
        2 => {
            if cx.is_known(call.node) {
                return Ok(());
            }
            let (Some(a), Some(b)) = (cx.item_of(first)?, cx.item_of(second)?) else {
                return Ok(());
            };
            let pair_ty = cx.types.item_type(cx.ty(call.node)).unwrap_or(TYPE_OBJECT);
            let serializer = cx.collection_of(call.node, Serializer::tuple(pair_ty, vec![a, b]))?;
            cx.add(call.node, serializer)
        }
        3 => {
            let Some(result) = cx.lambda_arg(call, 2, 2) else {
                return unknown(cx, call);
            };
            cx.deduce_item_and_collection(result.params[0], first)?;
            cx.deduce_item_and_collection(result.params[1], second)?;
            cx.deduce_collection_and_item(call.node, result.body)
        }
        _ => unknown(cx, call),
    }
}
