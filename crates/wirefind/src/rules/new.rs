//! Object construction and member initialization.

use wirefind_core::{Serializer, SerializerKind, TYPE_DOCUMENT, TypeShape};

use crate::Result;
use crate::expr::{ExprId, ExprKind};

use super::Deducer;

/// Constructor node fields, borrowed from the tree.
struct NewSite<'t> {
    node: ExprId,
    params: &'t [String],
    args: &'t [ExprId],
    members: Option<&'t [String]>,
}

impl<'a> Deducer<'a> {
    /// Visit a constructor. Under a member-init the constructor alone does
    /// not describe the value, so bottom-up synthesis is left to the
    /// member-init rule.
    pub(crate) fn visit_new(&mut self, node: ExprId, synthesize: bool) -> Result<()> {
        if self.is_pruned(node) {
            return Ok(());
        }
        let Some(site) = self.new_site(node) else {
            return self.visit(node);
        };

        self.deduce_new(&site, synthesize)?;
        if self.is_pruned(node) {
            return Ok(());
        }
        for &arg in site.args {
            self.visit(arg)?;
        }
        self.deduce_new(&site, synthesize)
    }

    fn new_site(&self, node: ExprId) -> Option<NewSite<'a>> {
        match self.kind(node) {
            ExprKind::New {
                params,
                args,
                members,
            } => Some(NewSite {
                node,
                params,
                args,
                members: members.as_deref(),
            }),
            _ => None,
        }
    }

    fn deduce_new(&mut self, site: &NewSite<'_>, synthesize: bool) -> Result<()> {
        match self.known(site.node) {
            Some(serializer) => {
                if !serializer.is_sentinel() && site.args.iter().any(|&arg| !self.is_known(arg)) {
                    self.deduce_new_arguments(site, &serializer)?;
                }
                Ok(())
            }
            None if synthesize && site.args.iter().all(|&arg| self.is_known(arg)) => {
                match self.synthesize_new(site)? {
                    Some(serializer) => self.add(site.node, serializer),
                    None => Ok(()),
                }
            }
            None => Ok(()),
        }
    }

    /// Top-down: the constructed value's serializer determines the
    /// serializers of the arguments it was built from.
    fn deduce_new_arguments(&mut self, site: &NewSite<'_>, serializer: &Serializer) -> Result<()> {
        let types = self.types;
        let fail = |err| self.serializer_error(site.node, err);

        match types.shape(self.ty(site.node)) {
            TypeShape::Document => Ok(()),
            TypeShape::KeyValuePair { .. } if site.args.len() == 2 => {
                let key = serializer.key_serializer().map_err(fail)?;
                let value = serializer.value_serializer().map_err(fail)?;
                self.add_if_unknown(site.args[0], key)?;
                self.add_if_unknown(site.args[1], value)
            }
            TypeShape::Tuple { .. } => {
                let SerializerKind::Tuple(items) = serializer.kind() else {
                    return Ok(());
                };
                for (&arg, item) in site.args.iter().zip(items) {
                    self.add_if_unknown(arg, item.clone())?;
                }
                Ok(())
            }
            TypeShape::Array(_) | TypeShape::Collection { .. } if site.args.len() == 1 => {
                let source = site.args[0];
                if types.item_type(self.ty(source)).is_none() {
                    return Ok(());
                }
                let item = serializer.item_serializer().map_err(fail)?;
                let collection = self.collection_of(source, item)?;
                self.add_if_unknown(source, collection)
            }
            _ => {
                for (index, &arg) in site.args.iter().enumerate() {
                    if self.is_known(arg) {
                        continue;
                    }
                    let Some(member) = self.constructed_member(site, index) else {
                        continue;
                    };
                    let member_serializer = serializer
                        .member_serializer(types, self.registry, &member)
                        .map_err(|err| self.serializer_error(site.node, err))?;
                    self.add(arg, member_serializer)?;
                }
                Ok(())
            }
        }
    }

    /// Bottom-up: every argument is known.
    fn synthesize_new(&self, site: &NewSite<'_>) -> Result<Option<Serializer>> {
        let types = self.types;
        let node_ty = self.ty(site.node);

        if node_ty == TYPE_DOCUMENT {
            return self.standard(site.node).map(Some);
        }

        let known: Vec<Serializer> = site
            .args
            .iter()
            .filter_map(|&arg| self.known(arg))
            .collect();
        if known.iter().any(Serializer::is_unknowable) {
            return Ok(Some(Serializer::unknowable(node_ty)));
        }

        match types.shape(node_ty) {
            TypeShape::KeyValuePair { .. } if known.len() == 2 => Ok(Some(
                Serializer::key_value_pair(node_ty, known[0].clone(), known[1].clone()),
            )),
            TypeShape::Tuple { .. } => Ok(Some(Serializer::tuple(node_ty, known))),
            TypeShape::Array(_) | TypeShape::Collection { .. }
                if known.len() == 1 && types.item_type(self.ty(site.args[0])).is_some() =>
            {
                let Some(item) = self.item_of(site.args[0])? else {
                    return Ok(None);
                };
                self.collection_of(site.node, item).map(Some)
            }
            TypeShape::Class(_) if site.args.is_empty() => {
                self.lookup(site.node, node_ty).map(Some)
            }
            _ => {
                let members = self.constructed_members(site)?;
                Ok(Some(Serializer::new(
                    node_ty,
                    SerializerKind::Composite(members),
                )))
            }
        }
    }

    /// Member initialized by constructor argument `index`.
    fn constructed_member(&self, site: &NewSite<'_>, index: usize) -> Option<String> {
        if let Some(members) = site.members {
            return members.get(index).cloned();
        }
        let param = site.params.get(index)?;
        let arg_ty = self.ty(*site.args.get(index)?);
        self.types
            .matching_member(self.ty(site.node), param, arg_ty)
            .map(|sym| self.types.resolve(sym).to_owned())
    }

    /// `(member, serializer)` for every constructor argument. Fails when an
    /// argument initializes no member, since the constructed value could
    /// not be described member by member.
    fn constructed_members(&self, site: &NewSite<'_>) -> Result<Vec<(String, Serializer)>> {
        let mut members = Vec::with_capacity(site.args.len());
        for (index, &arg) in site.args.iter().enumerate() {
            let Some(member) = self.constructed_member(site, index) else {
                let param = site.params.get(index).map_or("?", String::as_str);
                return Err(self.unsupported(
                    site.node,
                    format!(
                        "constructor parameter `{param}` does not match any member of {}",
                        self.types.display(self.ty(site.node))
                    ),
                ));
            };
            let Some(serializer) = self.known(arg) else {
                return Err(self.unsupported(arg, "constructor argument has no known serializer"));
            };
            members.push((member, serializer));
        }
        Ok(members)
    }

    /// `new T(..) { A = a, .. }`.
    pub(crate) fn deduce_member_init(&mut self, node: ExprId) -> Result<()> {
        let ExprKind::MemberInit { new, bindings } = self.kind(node) else {
            return Ok(());
        };
        let new = *new;

        if let Some(serializer) = self.known(node) {
            if serializer.is_sentinel() {
                return Ok(());
            }
            self.add_if_unknown(new, serializer.clone())?;
            for (member, value) in bindings {
                if self.is_known(*value) {
                    continue;
                }
                let member_serializer = serializer
                    .member_serializer(self.types, self.registry, member)
                    .map_err(|err| self.serializer_error(node, err))?;
                self.add(*value, member_serializer)?;
            }
            return Ok(());
        }

        let Some(site) = self.new_site(new) else {
            return Ok(());
        };
        let ready = site.args.iter().all(|&arg| self.is_known(arg))
            && bindings.iter().all(|(_, value)| self.is_known(*value));
        if !ready {
            return Ok(());
        }

        let mut members = self.constructed_members(&site)?;
        for (member, value) in bindings {
            if let Some(serializer) = self.known(*value) {
                members.push((member.clone(), serializer));
            }
        }
        let serializer = Serializer::new(self.ty(node), SerializerKind::Composite(members));
        self.add(node, serializer.clone())?;
        self.add_if_unknown(new, serializer)
    }
}
