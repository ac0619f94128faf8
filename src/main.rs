fn main() -> anyhow::Result<()> {
    prism::run()
}
