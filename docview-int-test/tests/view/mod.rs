mod cached_view_test;
mod view_registry_test;
