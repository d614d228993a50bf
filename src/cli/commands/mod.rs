use anyhow::Result;

pub mod config;
pub mod demo;
pub mod portal;
pub mod shops;
pub mod verify;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}
