pub(crate) mod testing;
