mod build;
mod focus;
mod interaction;
mod view;

pub(in crate::app) use focus::apply_focus_scope;
