fn main() -> Result<(), Box<dyn std::error::Error>> {
    ollama_assistant::cli::main()
}
