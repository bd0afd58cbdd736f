pub mod cc;
pub mod job;
pub mod net;

#[cfg(test)]
mod test;
