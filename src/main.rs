fn main() -> anyhow::Result<()> {
    medinsight_lib::run()
}
