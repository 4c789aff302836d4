//! Resource registry for managing record descriptors and generating CRUD routes

use axum::Router;
use axum::routing::get;
use indexmap::IndexMap;
use std::marker::PhantomData;

use super::handlers::{create_record, delete_record, get_record, list_records, update_record};
use crate::core::controller::ResourceController;
use crate::core::record::Record;

/// Trait that describes how to build routes for a resource
pub trait ResourceDescriptor: Send + Sync {
    /// The record type name (singular, e.g., "user")
    fn record_type(&self) -> &str;

    /// The plural path segment (e.g., "users")
    fn plural(&self) -> &str;

    /// Build the CRUD routes for this resource
    ///
    /// - GET/POST /{plural}
    /// - GET/PUT/PATCH/DELETE /{plural}/{id}
    fn build_routes(&self) -> Router;
}

/// Descriptor serving one record type through its controller
pub struct RecordResource<R: Record> {
    controller: ResourceController<R>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> RecordResource<R> {
    pub fn new(controller: ResourceController<R>) -> Self {
        Self {
            controller,
            _marker: PhantomData,
        }
    }
}

impl<R: Record> ResourceDescriptor for RecordResource<R> {
    fn record_type(&self) -> &str {
        R::record_type()
    }

    fn plural(&self) -> &str {
        R::resource_name()
    }

    fn build_routes(&self) -> Router {
        let collection = format!("/{}", R::resource_name());
        let item = format!("/{}/{{id}}", R::resource_name());

        Router::new()
            .route(&collection, get(list_records::<R>).post(create_record::<R>))
            .route(
                &item,
                get(get_record::<R>)
                    .put(update_record::<R>)
                    .patch(update_record::<R>)
                    .delete(delete_record::<R>),
            )
            .with_state(self.controller.clone())
    }
}

/// Registry for all resources served by the application
#[derive(Default)]
pub struct ResourceRegistry {
    descriptors: IndexMap<String, Box<dyn ResourceDescriptor>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource descriptor
    ///
    /// Descriptors are keyed by their path segment, so two resources can never
    /// claim the same routes; registering a taken segment replaces its owner.
    pub fn register(&mut self, descriptor: Box<dyn ResourceDescriptor>) {
        let plural = descriptor.plural().to_string();
        if let Some(previous) = self.descriptors.get(&plural) {
            tracing::warn!(
                path = %plural,
                replaced = previous.record_type(),
                by = descriptor.record_type(),
                "resource path registered twice"
            );
        }
        self.descriptors.insert(plural, descriptor);
    }

    /// Build a router with all registered resource routes
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Get all registered record types
    pub fn record_types(&self) -> Vec<&str> {
        self.descriptors.values().map(|d| d.record_type()).collect()
    }

    /// Get all registered path segments
    pub fn plurals(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}
