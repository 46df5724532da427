/// A read model fed from an event stream
pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);
}
