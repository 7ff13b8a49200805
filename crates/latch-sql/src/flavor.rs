/// The SQL dialect targeted by the serializer. Selects the positional
/// placeholder syntax; everything else rendered here is dialect-neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    Mysql,
    #[default]
    Postgresql,
    Sqlite,
}
