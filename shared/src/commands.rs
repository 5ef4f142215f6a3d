#[derive(Clone, Debug)]
pub enum Commands {
    ForceActivity,
    Shutdown,
}
