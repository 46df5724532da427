// implemented where a subscription closure holds an Rc back to its owner; the cycle has to be broken by hand
pub trait Destroyable {
    fn destroy(&mut self);
}
