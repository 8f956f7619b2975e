//! Method-call rules, dispatched by method name.
//!
//! Each handler checks the overload shape it understands (owner, arity,
//! lambda parameter counts) and falls back to [`Deducer::deduce_unknown_method`]
//! otherwise, which marks the call as unknowable.

mod mql;
mod scalar;
mod sequence;

#[cfg(test)]
mod mql_tests;

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::Result;
use crate::expr::{ExprId, ExprKind, MethodRef, Owner};

use super::Deducer;

/// A call node with its parts borrowed from the tree.
pub(crate) struct CallSite<'t> {
    pub(crate) node: ExprId,
    pub(crate) method: &'t MethodRef,
    pub(crate) object: Option<ExprId>,
    pub(crate) args: &'t [ExprId],
}

impl CallSite<'_> {
    pub(crate) fn owner(&self) -> Owner {
        self.method.owner
    }

    pub(crate) fn is_owned_by(&self, owners: &[Owner]) -> bool {
        owners.contains(&self.method.owner)
    }

    pub(crate) fn arity(&self) -> usize {
        self.args.len()
    }

    pub(crate) fn is_static(&self) -> bool {
        self.method.is_static
    }
}

/// Lambda argument: its parameters and body.
pub(crate) struct Lambda<'t> {
    pub(crate) params: &'t [ExprId],
    pub(crate) body: ExprId,
}

pub(crate) type MethodRule = fn(&mut Deducer<'_>, &CallSite<'_>) -> Result<()>;

static METHOD_RULES: LazyLock<HashMap<&'static str, MethodRule>> = LazyLock::new(build_table);

fn build_table() -> HashMap<&'static str, MethodRule> {
    let mut table: HashMap<&'static str, MethodRule> = HashMap::new();
    let mut register = |names: &[&'static str], rule: MethodRule| {
        for &name in names {
            let previous = table.insert(name, rule);
            debug_assert!(previous.is_none(), "method `{name}` registered twice");
        }
    };

    register(&["Abs"], scalar::abs);
    register(&["Add"], scalar::add);
    register(
        &[
            "AddDays",
            "AddHours",
            "AddMilliseconds",
            "AddMinutes",
            "AddMonths",
            "AddQuarters",
            "AddSeconds",
            "AddTicks",
            "AddWeeks",
            "AddYears",
        ],
        scalar::add_time,
    );
    register(&["Ceiling", "Floor"], scalar::rounding);
    register(&["Compare", "CompareTo"], scalar::compare);
    register(&["DegreesToRadians", "RadiansToDegrees"], scalar::math_double);
    register(&["EndsWith", "StartsWith"], scalar::string_predicate);
    register(&["Equals"], scalar::equals);
    register(&["Exp", "Ln", "Log", "Log10", "Pow", "Sqrt"], scalar::math_double);
    register(
        &[
            "Acos", "Acosh", "Asin", "Asinh", "Atan", "Atan2", "Atanh", "Cos", "Cosh", "Sin",
            "Sinh", "Tan", "Tanh",
        ],
        scalar::math_double,
    );
    register(&["IndexOf", "IndexOfBytes"], scalar::index_of);
    register(&["IsMatch"], scalar::is_match);
    register(&["IsNullOrEmpty", "IsNullOrWhiteSpace"], scalar::is_null_or_empty);
    register(&["Parse"], scalar::parse);
    register(&["Round"], scalar::rounding);
    register(&["Split"], scalar::split);
    register(&["StringIn"], scalar::string_in);
    register(&["StrLenBytes"], scalar::str_len_bytes);
    register(&["Substring", "SubstrBytes"], scalar::string_transform);
    register(
        &["ToLower", "ToLowerInvariant", "ToUpper", "ToUpperInvariant", "Trim"],
        scalar::string_transform,
    );
    register(&["Subtract"], scalar::subtract);
    register(&["ToString"], scalar::to_string);
    register(&["Truncate"], scalar::truncate);
    register(&["Week"], scalar::week);

    register(&["Aggregate"], sequence::aggregate);
    register(&["All"], sequence::all);
    register(&["Any"], sequence::any);
    register(&["Append", "Prepend"], sequence::append);
    register(&["AsQueryable"], sequence::as_queryable);
    register(&["Average", "Median", "Percentile"], sequence::average);
    register(
        &["Bottom", "BottomN", "FirstN", "LastN", "MaxN", "MinN", "Top", "TopN"],
        sequence::pick,
    );
    register(&["Concat"], sequence::concat);
    register(&["Contains"], sequence::contains);
    register(&["Count", "LongCount"], sequence::count);
    register(&["DefaultIfEmpty"], sequence::default_if_empty);
    register(&["Distinct", "Reverse"], sequence::same_sequence);
    register(&["ElementAt", "ElementAtOrDefault"], sequence::element_at);
    register(&["Except", "Intersect", "Union"], sequence::set_operation);
    register(&["Exists"], sequence::exists);
    register(
        &[
            "First",
            "FirstOrDefault",
            "Last",
            "LastOrDefault",
            "Single",
            "SingleOrDefault",
        ],
        sequence::first,
    );
    register(&["GroupBy"], sequence::group_by);
    register(&["GroupJoin"], sequence::group_join);
    register(&["IsSubsetOf", "SetEquals"], sequence::set_predicate);
    register(&["Join"], sequence::join);
    register(
        &["AllElements", "AllMatchingElements", "FirstMatchingElement"],
        sequence::all_elements,
    );
    register(&["Max", "Min"], sequence::max);
    register(&["OfType"], sequence::of_type);
    register(
        &["OrderBy", "OrderByDescending", "ThenBy", "ThenByDescending"],
        sequence::order_by,
    );
    register(&["Range"], sequence::range);
    register(&["Repeat"], sequence::repeat);
    register(&["Select"], sequence::select);
    register(&["SelectMany"], sequence::select_many);
    register(&["SequenceEqual"], sequence::sequence_equal);
    register(&["Shift"], sequence::shift);
    register(&["Skip", "Take"], sequence::same_sequence);
    register(&["SkipWhile", "TakeWhile", "Where"], sequence::filter);
    register(
        &["StandardDeviationPopulation", "StandardDeviationSample", "Sum"],
        sequence::sum,
    );
    register(&["ToArray", "ToList"], sequence::to_collection);
    register(&["Zip"], sequence::zip);

    register(&["AppendStage"], mql::append_stage);
    register(&["As"], mql::as_serializer);
    register(&["Constant"], mql::constant);
    register(&["ContainsKey"], mql::contains_key);
    register(&["ContainsValue"], mql::contains_value);
    register(&["Convert"], mql::convert);
    register(&["Create"], mql::create);
    register(&["Documents"], mql::documents);
    register(&["IsMissing", "IsNullOrMissing"], mql::field_predicate);
    register(&["Field"], mql::field);
    register(&["get_Chars"], mql::get_chars);
    register(&["get_Item"], mql::get_item);
    register(&["Inject"], mql::inject);
    register(&["Lookup"], mql::lookup);

    table
}

impl<'a> Deducer<'a> {
    pub(crate) fn deduce_call(&mut self, call: &CallSite<'_>) -> Result<()> {
        match METHOD_RULES.get(call.method.name.as_str()) {
            Some(rule) => rule(self, call),
            None => self.deduce_unknown_method(call),
        }
    }

    /// A call no rule understands can never be encoded. Marking it
    /// unknowable prunes its operands.
    pub(crate) fn deduce_unknown_method(&mut self, call: &CallSite<'_>) -> Result<()> {
        self.add_unknowable(call.node)
    }

    /// Lambda argument at `index` with exactly `params` parameters.
    /// Queryable operators take their lambdas quoted.
    pub(crate) fn lambda_arg(&self, call: &CallSite<'_>, index: usize, params: usize) -> Option<Lambda<'a>> {
        let mut arg = *call.args.get(index)?;
        if let ExprKind::Quote(inner) = self.kind(arg)
            && call.owner().is_queryable()
        {
            arg = *inner;
        }
        match self.kind(arg) {
            ExprKind::Lambda { params: found, body } if found.len() == params => Some(Lambda {
                params: found,
                body: *body,
            }),
            _ => None,
        }
    }

    /// Whether the argument at `index` is a lambda (quoted or not).
    pub(crate) fn is_lambda_arg(&self, call: &CallSite<'_>, index: usize) -> bool {
        let Some(&arg) = call.args.get(index) else {
            return false;
        };
        match self.kind(arg) {
            ExprKind::Lambda { .. } => true,
            ExprKind::Quote(inner) => matches!(self.kind(*inner), ExprKind::Lambda { .. }),
            _ => false,
        }
    }
}
